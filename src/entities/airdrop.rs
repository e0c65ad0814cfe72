use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "airdrops")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub distribution_method_id: i64,
    /// JSON array of recipient wallet addresses
    #[sea_orm(column_type = "Json")]
    pub addresses: Json,
    pub claim_count: i32,
}

impl Model {
    pub fn recipients(&self) -> Vec<String> {
        serde_json::from_value(self.addresses.clone()).unwrap_or_default()
    }
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
