//! Geofence settings for location-based distribution.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "location_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub distribution_method_id: i64,
    #[sea_orm(column_type = "String(StringLen::N(128))", nullable)]
    pub label: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub claim_count: i32,
    pub max_claims: Option<i32>,
    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,
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
