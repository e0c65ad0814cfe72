//! One row per (POAP, wallet). The composite key rejects double claims.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::distribution_method::MethodKind;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poap_claims")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub poap_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub wallet_address: String,
    pub distribution_method_id: i64,
    pub method_kind: MethodKind,
    /// Signature returned by the transfer service once the token moved
    pub transaction_signature: Option<String>,
    pub claimed_at: DateTimeWithTimeZone,
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
    #[sea_orm(
        belongs_to = "super::distribution_method::Entity",
        from = "Column::DistributionMethodId",
        to = "super::distribution_method::Column::Id",
        on_delete = "Cascade"
    )]
    DistributionMethod,
}

impl Related<super::poap::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poap.def()
    }
}

impl Related<super::distribution_method::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DistributionMethod.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
