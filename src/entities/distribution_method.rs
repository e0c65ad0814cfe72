//! Distribution method header row. The kind-specific settings live in
//! `claim_link`, `secret_word`, `location_rule` and `airdrop`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "distribution_methods")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub poap_id: i64,
    pub kind: MethodKind,
    pub disabled: bool,
    /// Soft delete flag; deleted methods keep their claims for analytics
    pub deleted: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn is_active(&self) -> bool {
        !self.disabled && !self.deleted
    }
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    #[sea_orm(string_value = "claim_links")]
    ClaimLinks,
    #[sea_orm(string_value = "secret_word")]
    SecretWord,
    #[sea_orm(string_value = "location_based")]
    LocationBased,
    #[sea_orm(string_value = "airdrop")]
    Airdrop,
}

impl MethodKind {
    pub const ALL: [MethodKind; 4] = [
        MethodKind::ClaimLinks,
        MethodKind::SecretWord,
        MethodKind::LocationBased,
        MethodKind::Airdrop,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MethodKind::ClaimLinks => "claim_links",
            MethodKind::SecretWord => "secret_word",
            MethodKind::LocationBased => "location_based",
            MethodKind::Airdrop => "airdrop",
        }
    }
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
    #[sea_orm(has_many = "super::claim_link::Entity")]
    ClaimLink,
    #[sea_orm(has_one = "super::secret_word::Entity")]
    SecretWord,
    #[sea_orm(has_one = "super::location_rule::Entity")]
    LocationRule,
    #[sea_orm(has_one = "super::airdrop::Entity")]
    Airdrop,
}

impl Related<super::poap::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poap.def()
    }
}

impl Related<super::claim_link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClaimLink.def()
    }
}

impl Related<super::secret_word::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SecretWord.def()
    }
}

impl Related<super::location_rule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LocationRule.def()
    }
}

impl Related<super::airdrop::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Airdrop.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
