use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::distribution_method::MethodKind;
use crate::entities::poap_claim;
use crate::models::poap::PoapSummary;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimView {
    pub poap_id: i64,
    pub wallet_address: String,
    pub distribution_method_id: i64,
    pub method_kind: MethodKind,
    pub transaction_signature: Option<String>,
    pub claimed_at: DateTime<Utc>,
}

impl From<poap_claim::Model> for ClaimView {
    fn from(model: poap_claim::Model) -> Self {
        Self {
            poap_id: model.poap_id,
            wallet_address: model.wallet_address,
            distribution_method_id: model.distribution_method_id,
            method_kind: model.method_kind,
            transaction_signature: model.transaction_signature,
            claimed_at: model.claimed_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimReceiptView {
    pub success: bool,
    pub message: String,
    pub claim: ClaimView,
    pub mint_address: String,
    pub distance_meters: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimStatusView {
    pub poap_id: i64,
    pub wallet_address: String,
    pub claimed: bool,
    pub claim: Option<ClaimView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletClaimEntry {
    pub poap: PoapSummary,
    pub distribution_method_id: i64,
    pub method_kind: MethodKind,
    pub transaction_signature: Option<String>,
    pub claimed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimLinkLookupView {
    pub token: String,
    pub poap: PoapSummary,
    pub claimed: bool,
    pub claimed_by: Option<String>,
    pub expired: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub available: bool,
}

// Claim submissions

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClaimLinkRequest {
    pub token: String,
    pub wallet_address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SecretWordClaimRequest {
    pub wallet_address: String,
    pub word: String,
    pub distribution_method_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LocationClaimRequest {
    pub wallet_address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distribution_method_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AirdropClaimRequest {
    pub wallet_address: String,
    pub distribution_method_id: Option<i64>,
}
