use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::distribution_method::MethodKind;
use crate::entities::{airdrop, claim_link, distribution_method, location_rule, secret_word};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionMethodView {
    pub id: i64,
    pub poap_id: i64,
    pub kind: MethodKind,
    pub disabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub details: MethodDetails,
}

impl DistributionMethodView {
    pub fn new(method: distribution_method::Model, details: MethodDetails) -> Self {
        assert_eq!(method.kind, details.kind(), "Details must match method kind");
        Self {
            id: method.id,
            poap_id: method.poap_id,
            kind: method.kind,
            disabled: method.disabled,
            created_at: method.created_at.with_timezone(&Utc),
            updated_at: method.updated_at.with_timezone(&Utc),
            details,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MethodDetails {
    ClaimLinks {
        total_links: u64,
        claimed_links: u64,
        links: Vec<ClaimLinkView>,
    },
    SecretWord {
        word: String,
        claim_count: i32,
        max_claims: Option<i32>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    },
    LocationBased {
        label: Option<String>,
        latitude: f64,
        longitude: f64,
        radius_meters: f64,
        claim_count: i32,
        max_claims: Option<i32>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    },
    Airdrop {
        addresses: Vec<String>,
        claim_count: i32,
    },
}

impl MethodDetails {
    pub fn kind(&self) -> MethodKind {
        match self {
            MethodDetails::ClaimLinks { .. } => MethodKind::ClaimLinks,
            MethodDetails::SecretWord { .. } => MethodKind::SecretWord,
            MethodDetails::LocationBased { .. } => MethodKind::LocationBased,
            MethodDetails::Airdrop { .. } => MethodKind::Airdrop,
        }
    }

    pub fn from_links(links: Vec<claim_link::Model>) -> Self {
        let claimed_links = links.iter().filter(|link| link.claimed).count() as u64;
        MethodDetails::ClaimLinks {
            total_links: links.len() as u64,
            claimed_links,
            links: links.into_iter().map(ClaimLinkView::from).collect(),
        }
    }
}

impl From<secret_word::Model> for MethodDetails {
    fn from(model: secret_word::Model) -> Self {
        MethodDetails::SecretWord {
            word: model.word,
            claim_count: model.claim_count,
            max_claims: model.max_claims,
            start_date: model.start_date.map(|dt| dt.with_timezone(&Utc)),
            end_date: model.end_date.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl From<location_rule::Model> for MethodDetails {
    fn from(model: location_rule::Model) -> Self {
        MethodDetails::LocationBased {
            label: model.label,
            latitude: model.latitude,
            longitude: model.longitude,
            radius_meters: model.radius_meters,
            claim_count: model.claim_count,
            max_claims: model.max_claims,
            start_date: model.start_date.map(|dt| dt.with_timezone(&Utc)),
            end_date: model.end_date.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl From<airdrop::Model> for MethodDetails {
    fn from(model: airdrop::Model) -> Self {
        MethodDetails::Airdrop {
            addresses: model.recipients(),
            claim_count: model.claim_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimLinkView {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub claimed: bool,
    pub claimed_by: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
}

impl From<claim_link::Model> for ClaimLinkView {
    fn from(model: claim_link::Model) -> Self {
        Self {
            token: model.token,
            expires_at: model.expires_at.map(|dt| dt.with_timezone(&Utc)),
            claimed: model.claimed,
            claimed_by: model.claimed_by,
            claimed_at: model.claimed_at.map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

// Request/Response types for distribution HTTP API

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateClaimLinksRequest {
    pub amount: u32,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateSecretWordRequest {
    pub word: String,
    pub max_claims: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateLocationRequest {
    pub label: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub max_claims: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateAirdropRequest {
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateMethodRequest {
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationVerifyRequest {
    pub distribution_method_id: i64,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationVerifyResponse {
    pub distribution_method_id: i64,
    pub in_range: bool,
    pub distance_meters: f64,
    pub radius_meters: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AirdropOutcome {
    Claimed,
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirdropRecipientResult {
    pub wallet_address: String,
    pub outcome: AirdropOutcome,
    pub transaction_signature: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AirdropExecutionView {
    pub poap_id: i64,
    pub distribution_method_id: i64,
    pub claimed: u64,
    pub skipped: u64,
    pub failed: u64,
    pub results: Vec<AirdropRecipientResult>,
}
