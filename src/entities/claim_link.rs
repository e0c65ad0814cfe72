//! Single-use claim link tokens.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "claim_links")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub distribution_method_id: i64,
    #[sea_orm(column_type = "String(StringLen::N(64))", unique)]
    pub token: String,
    pub expires_at: Option<DateTimeWithTimeZone>,
    pub claimed: bool,
    #[sea_orm(column_type = "String(StringLen::N(64))", nullable)]
    pub claimed_by: Option<String>,
    pub claimed_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::distribution_method::Entity",
        from = "Column::DistributionMethodId",
        to = "super::distribution_method::Column::Id",
        on_delete = "Cascade"
    )]
    DistributionMethod,
}

impl Related<super::distribution_method::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DistributionMethod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
