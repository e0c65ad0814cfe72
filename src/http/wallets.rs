use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::entities::{poap, poap_claim};
use crate::models::claim::WalletClaimEntry;
use crate::state::AppState;
use crate::wallet::sanitize_wallet_address;

use super::HttpError;

pub fn router() -> Router<AppState> {
    Router::new().route("/wallets/{address}/claims", get(wallet_collection))
}

#[derive(Debug, Serialize)]
pub struct WalletCollectionResponse {
    pub wallet_address: String,
    pub total: u64,
    pub claims: Vec<WalletClaimEntry>,
}

/// Newest claims first.
async fn wallet_collection(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<WalletCollectionResponse>, HttpError> {
    let wallet =
        sanitize_wallet_address(&address).map_err(|err| HttpError::bad_request(err.to_string()))?;

    let rows = poap_claim::Entity::find()
        .filter(poap_claim::Column::WalletAddress.eq(wallet.as_str()))
        .order_by_desc(poap_claim::Column::ClaimedAt)
        .find_also_related(poap::Entity)
        .all(&state.database)
        .await?;

    let claims: Vec<WalletClaimEntry> = rows
        .into_iter()
        .filter_map(|(claim, poap)| {
            poap.map(|poap| WalletClaimEntry {
                poap: poap.into(),
                distribution_method_id: claim.distribution_method_id,
                method_kind: claim.method_kind,
                transaction_signature: claim.transaction_signature,
                claimed_at: claim.claimed_at.with_timezone(&Utc),
            })
        })
        .collect();

    Ok(Json(WalletCollectionResponse {
        wallet_address: wallet,
        total: claims.len() as u64,
        claims,
    }))
}
