//! POAP event records.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poaps")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_type = "String(StringLen::N(128))")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "String(StringLen::N(512))")]
    pub image_url: String,
    #[sea_orm(column_type = "String(StringLen::N(512))", nullable)]
    pub website: Option<String>,
    pub start_date: DateTimeWithTimeZone,
    pub end_date: DateTimeWithTimeZone,
    pub attendees: Option<i32>,
    /// Wallet of the creator, used to scope listings and overview analytics
    #[sea_orm(column_type = "String(StringLen::N(64))")]
    pub creator_wallet: String,
    pub status: PoapStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PoapStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "published")]
    Published,
    #[sea_orm(string_value = "distributed")]
    Distributed,
}

impl PoapStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PoapStatus::Draft => "draft",
            PoapStatus::Published => "published",
            PoapStatus::Distributed => "distributed",
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::distribution_method::Entity")]
    DistributionMethod,
    #[sea_orm(has_many = "super::poap_claim::Entity")]
    PoapClaim,
    #[sea_orm(has_one = "super::poap_token::Entity")]
    PoapToken,
}

impl Related<super::distribution_method::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DistributionMethod.def()
    }
}

impl Related<super::poap_claim::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PoapClaim.def()
    }
}

impl Related<super::poap_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PoapToken.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
