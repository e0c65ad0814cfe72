//! POAP catalogue: creation, editing, deletion and token registration.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::entities::poap::{self, PoapStatus};
use crate::entities::{
    airdrop, claim_link, distribution_method, location_rule, poap_claim, poap_token, secret_word,
};
use crate::models::poap::{
    PoapCreateRequest, PoapSummary, PoapTokenRequest, PoapTokenView, PoapUpdateRequest, PoapView,
};
use crate::state::AppState;
use crate::wallet::sanitize_wallet_address;

use super::HttpError;

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

const MAX_TITLE_LEN: usize = 128;
const MAX_DESCRIPTION_LEN: usize = 5_000;
const MAX_URL_LEN: usize = 512;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/poaps", get(list_poaps).post(create_poap))
        .route(
            "/poaps/{id}",
            get(get_poap).patch(update_poap).delete(delete_poap),
        )
        .route("/poaps/{id}/token", get(get_token).put(put_token))
}

#[derive(Debug, Default, Deserialize)]
pub struct PoapListQuery {
    pub creator: Option<String>,
    pub status: Option<PoapStatus>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct PoapListResponse {
    pub poaps: Vec<PoapSummary>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

async fn list_poaps(
    State(state): State<AppState>,
    Query(query): Query<PoapListQuery>,
) -> Result<Json<PoapListResponse>, HttpError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    let mut select = poap::Entity::find();
    if let Some(creator) = query.creator {
        let creator = sanitize_wallet_address(&creator)
            .map_err(|err| HttpError::bad_request(err.to_string()))?;
        select = select.filter(poap::Column::CreatorWallet.eq(creator));
    }
    if let Some(status) = query.status {
        select = select.filter(poap::Column::Status.eq(status));
    }

    let total = select.clone().count(&state.database).await?;
    let poaps = select
        .order_by_desc(poap::Column::CreatedAt)
        .order_by_desc(poap::Column::Id)
        .limit(limit)
        .offset(offset)
        .all(&state.database)
        .await?
        .into_iter()
        .map(PoapSummary::from)
        .collect();

    Ok(Json(PoapListResponse {
        poaps,
        total,
        limit,
        offset,
    }))
}

async fn create_poap(
    State(state): State<AppState>,
    Json(request): Json<PoapCreateRequest>,
) -> Result<(StatusCode, Json<PoapView>), HttpError> {
    let title = validate_title(&request.title)?;
    let description = validate_description(&request.description)?;
    let image_url = validate_url("image_url", &request.image_url)?;
    let website = request
        .website
        .as_deref()
        .map(|url| validate_url("website", url))
        .transpose()?;
    validate_dates(request.start_date, request.end_date)?;
    validate_attendees(request.attendees)?;
    let creator = sanitize_wallet_address(&request.creator_wallet)
        .map_err(|err| HttpError::bad_request(err.to_string()))?;

    let now = Utc::now().fixed_offset();
    let model = poap::ActiveModel {
        id: NotSet,
        title: Set(title),
        description: Set(description),
        image_url: Set(image_url),
        website: Set(website),
        start_date: Set(request.start_date.fixed_offset()),
        end_date: Set(request.end_date.fixed_offset()),
        attendees: Set(request.attendees),
        creator_wallet: Set(creator),
        status: Set(PoapStatus::Draft),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.database)
    .await?;

    state.cache.overview_analytics.invalidate_all();
    info!("Created POAP {} for {}", model.id, model.creator_wallet);

    Ok((StatusCode::CREATED, Json(PoapView::new(model, None, 0))))
}

async fn get_poap(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PoapView>, HttpError> {
    let model = find_poap(&state, id).await?;
    let token = poap_token::Entity::find_by_id(id)
        .one(&state.database)
        .await?;
    let total_claims = count_claims(&state, id).await?;
    Ok(Json(PoapView::new(model, token, total_claims)))
}

async fn update_poap(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<PoapUpdateRequest>,
) -> Result<Json<PoapView>, HttpError> {
    let model = find_poap(&state, id).await?;

    let start_date = request
        .start_date
        .unwrap_or_else(|| model.start_date.with_timezone(&Utc));
    let end_date = request
        .end_date
        .unwrap_or_else(|| model.end_date.with_timezone(&Utc));
    validate_dates(start_date, end_date)?;
    validate_attendees(request.attendees)?;

    let mut active = model.into_active_model();
    if let Some(title) = &request.title {
        active.title = Set(validate_title(title)?);
    }
    if let Some(description) = &request.description {
        active.description = Set(validate_description(description)?);
    }
    if let Some(image_url) = &request.image_url {
        active.image_url = Set(validate_url("image_url", image_url)?);
    }
    if let Some(website) = &request.website {
        let website = website.trim();
        active.website = Set(if website.is_empty() {
            None
        } else {
            Some(validate_url("website", website)?)
        });
    }
    if request.attendees.is_some() {
        active.attendees = Set(request.attendees);
    }
    active.start_date = Set(start_date.fixed_offset());
    active.end_date = Set(end_date.fixed_offset());
    active.updated_at = Set(Utc::now().fixed_offset());

    let model = active.update(&state.database).await?;
    state.cache.invalidate_poap(id).await;

    let token = poap_token::Entity::find_by_id(id)
        .one(&state.database)
        .await?;
    let total_claims = count_claims(&state, id).await?;
    Ok(Json(PoapView::new(model, token, total_claims)))
}

async fn delete_poap(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, HttpError> {
    let model = find_poap(&state, id).await?;
    let claims = count_claims(&state, id).await?;
    if claims > 0 {
        return Err(HttpError::conflict(format!(
            "POAP {id} has {claims} claims and cannot be deleted"
        )));
    }

    let method_ids: Vec<i64> = distribution_method::Entity::find()
        .select_only()
        .column(distribution_method::Column::Id)
        .filter(distribution_method::Column::PoapId.eq(id))
        .into_tuple()
        .all(&state.database)
        .await?;

    let txn = state.database.begin().await?;
    claim_link::Entity::delete_many()
        .filter(claim_link::Column::DistributionMethodId.is_in(method_ids.clone()))
        .exec(&txn)
        .await?;
    secret_word::Entity::delete_many()
        .filter(secret_word::Column::DistributionMethodId.is_in(method_ids.clone()))
        .exec(&txn)
        .await?;
    location_rule::Entity::delete_many()
        .filter(location_rule::Column::DistributionMethodId.is_in(method_ids.clone()))
        .exec(&txn)
        .await?;
    airdrop::Entity::delete_many()
        .filter(airdrop::Column::DistributionMethodId.is_in(method_ids))
        .exec(&txn)
        .await?;
    distribution_method::Entity::delete_many()
        .filter(distribution_method::Column::PoapId.eq(id))
        .exec(&txn)
        .await?;
    poap_token::Entity::delete_by_id(id).exec(&txn).await?;
    model.delete(&txn).await?;
    txn.commit().await?;
    state.cache.invalidate_poap(id).await;
    info!("Deleted POAP {id}");

    Ok(StatusCode::NO_CONTENT)
}

async fn get_token(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PoapTokenView>, HttpError> {
    find_poap(&state, id).await?;
    let token = poap_token::Entity::find_by_id(id)
        .one(&state.database)
        .await?
        .ok_or_else(|| HttpError::not_found(format!("POAP {id} has no registered token")))?;
    Ok(Json(token.into()))
}

async fn put_token(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<PoapTokenRequest>,
) -> Result<Json<PoapTokenView>, HttpError> {
    find_poap(&state, id).await?;
    let mint_address = sanitize_wallet_address(&request.mint_address)
        .map_err(|_| HttpError::bad_request("mint_address is not a valid address"))?;
    let metadata_uri = validate_url("metadata_uri", &request.metadata_uri)?;

    let now = Utc::now().fixed_offset();
    let existing = poap_token::Entity::find_by_id(id)
        .one(&state.database)
        .await?;
    let token = match existing {
        Some(existing) => {
            let mut active = existing.into_active_model();
            active.mint_address = Set(mint_address);
            active.metadata_uri = Set(metadata_uri);
            active.updated_at = Set(now);
            active.update(&state.database).await?
        }
        None => {
            poap_token::ActiveModel {
                poap_id: Set(id),
                mint_address: Set(mint_address),
                metadata_uri: Set(metadata_uri),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&state.database)
            .await?
        }
    };
    info!("Registered token {} for POAP {id}", token.mint_address);

    Ok(Json(token.into()))
}

pub(super) async fn find_poap(state: &AppState, id: i64) -> Result<poap::Model, HttpError> {
    poap::Entity::find_by_id(id)
        .one(&state.database)
        .await?
        .ok_or_else(|| HttpError::not_found(format!("POAP {id} not found")))
}

async fn count_claims(state: &AppState, id: i64) -> Result<u64, HttpError> {
    Ok(poap_claim::Entity::find()
        .filter(poap_claim::Column::PoapId.eq(id))
        .count(&state.database)
        .await?)
}

fn validate_title(title: &str) -> Result<String, HttpError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_LEN {
        return Err(HttpError::bad_request(format!(
            "title must be 1 to {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn validate_description(description: &str) -> Result<String, HttpError> {
    let description = description.trim();
    if description.is_empty() || description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(HttpError::bad_request(format!(
            "description must be 1 to {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(description.to_string())
}

pub(super) fn validate_url(field: &str, url: &str) -> Result<String, HttpError> {
    let url = url.trim();
    let has_scheme = url.starts_with("https://") || url.starts_with("http://");
    if !has_scheme || url.len() > MAX_URL_LEN {
        return Err(HttpError::bad_request(format!(
            "{field} must be an http(s) URL of at most {MAX_URL_LEN} characters"
        )));
    }
    Ok(url.to_string())
}

pub(super) fn validate_dates(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(), HttpError> {
    if end < start {
        return Err(HttpError::bad_request(
            "end_date must not be before start_date",
        ));
    }
    Ok(())
}

fn validate_attendees(attendees: Option<i32>) -> Result<(), HttpError> {
    match attendees {
        Some(count) if count < 0 => Err(HttpError::bad_request(
            "attendees must not be negative",
        )),
        _ => Ok(()),
    }
}
