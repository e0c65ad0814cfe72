//! On-chain token backing a POAP.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poap_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub poap_id: i64,
    #[sea_orm(column_type = "String(StringLen::N(64))")]
    pub mint_address: String,
    #[sea_orm(column_type = "String(StringLen::N(512))")]
    pub metadata_uri: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poap::Entity",
        from = "Column::PoapId",
        to = "super::poap::Column::Id",
        on_delete = "Cascade"
    )]
    Poap,
}

impl Related<super::poap::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poap.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
