use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use crate::analytics;
use crate::models::analytics::{OverviewAnalyticsView, PoapAnalyticsView};
use crate::state::AppState;
use crate::wallet::sanitize_wallet_address;

use super::HttpError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/poaps/{id}/analytics", get(poap_analytics))
        .route("/analytics/overview", get(overview))
}

#[derive(Debug, Default, Deserialize)]
pub struct OverviewQuery {
    pub creator: Option<String>,
}

async fn poap_analytics(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PoapAnalyticsView>, HttpError> {
    let view = analytics::poap_analytics(&state, id)
        .await?
        .ok_or_else(|| HttpError::not_found(format!("POAP {id} not found")))?;
    Ok(Json((*view).clone()))
}

async fn overview(
    State(state): State<AppState>,
    Query(query): Query<OverviewQuery>,
) -> Result<Json<OverviewAnalyticsView>, HttpError> {
    let creator = query
        .creator
        .filter(|creator| !creator.trim().is_empty())
        .map(|creator| sanitize_wallet_address(&creator))
        .transpose()
        .map_err(|err| HttpError::bad_request(err.to_string()))?;
    let view = analytics::overview(&state, creator).await?;
    Ok(Json((*view).clone()))
}
