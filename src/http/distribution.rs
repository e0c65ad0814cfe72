//! Distribution method management for a POAP.
//!
//! Every create, toggle or delete recomputes the POAP status and drops the
//! cached analytics for it.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, QueryOrder, TransactionTrait,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::claims::{ClaimProcessor, MethodRow, load_method_row};
use crate::entities::distribution_method::{self, MethodKind};
use crate::entities::{airdrop, claim_link, location_rule, secret_word};
use crate::geo::{Coordinates, check_geofence};
use crate::models::distribution::{
    AirdropExecutionView, CreateAirdropRequest, CreateClaimLinksRequest, CreateLocationRequest,
    CreateSecretWordRequest, DistributionMethodView, LocationVerifyRequest,
    LocationVerifyResponse, MethodDetails, UpdateMethodRequest,
};
use crate::state::AppState;
use crate::status::recompute_status;
use crate::wallet::normalize_address_list;

use super::HttpError;
use super::poaps::{find_poap, validate_dates};

const MAX_SECRET_WORD_LEN: usize = 128;
const MAX_LABEL_LEN: usize = 128;
/// Geofences wider than this are treated as a configuration mistake.
const MAX_RADIUS_METERS: f64 = 50_000.0;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/poaps/{id}/distribution", get(list_methods))
        .route(
            "/poaps/{id}/distribution/claim-links",
            post(create_claim_links),
        )
        .route(
            "/poaps/{id}/distribution/secret-word",
            post(create_secret_word),
        )
        .route("/poaps/{id}/distribution/location", post(create_location))
        .route("/poaps/{id}/distribution/airdrop", post(create_airdrop))
        .route(
            "/poaps/{id}/distribution/{method_id}",
            patch(update_method).delete(delete_method),
        )
        .route(
            "/poaps/{id}/distribution/{method_id}/airdrop/execute",
            post(execute_airdrop),
        )
        .route("/distribution/location-verify", post(verify_location))
}

async fn list_methods(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<DistributionMethodView>>, HttpError> {
    find_poap(&state, id).await?;
    let methods = distribution_method::Entity::find()
        .filter(distribution_method::Column::PoapId.eq(id))
        .filter(distribution_method::Column::Deleted.eq(false))
        .order_by_asc(distribution_method::Column::Id)
        .all(&state.database)
        .await?;

    let mut views = Vec::with_capacity(methods.len());
    for method in methods {
        let details = load_details(&state.database, &method).await?;
        views.push(DistributionMethodView::new(method, details));
    }
    Ok(Json(views))
}

async fn create_claim_links(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CreateClaimLinksRequest>,
) -> Result<(StatusCode, Json<DistributionMethodView>), HttpError> {
    find_poap(&state, id).await?;
    let limit = state.distribution.max_claim_links_per_batch;
    if request.amount == 0 || request.amount > limit {
        return Err(HttpError::bad_request(format!(
            "amount must be between 1 and {limit}"
        )));
    }
    if let Some(expires_at) = request.expires_at {
        if expires_at <= Utc::now() {
            return Err(HttpError::bad_request("expires_at must be in the future"));
        }
    }

    let txn = state.database.begin().await?;
    let method = insert_method(&txn, id, MethodKind::ClaimLinks).await?;
    let links: Vec<claim_link::ActiveModel> = (0..request.amount)
        .map(|_| claim_link::ActiveModel {
            id: NotSet,
            distribution_method_id: Set(method.id),
            token: Set(generate_link_token()),
            expires_at: Set(request.expires_at.map(|dt| dt.fixed_offset())),
            claimed: Set(false),
            claimed_by: Set(None),
            claimed_at: Set(None),
        })
        .collect();
    claim_link::Entity::insert_many(links).exec(&txn).await?;
    let details = load_details(&txn, &method).await?;
    txn.commit().await?;

    finish_mutation(&state, id).await?;
    info!(
        "Created {} claim links for POAP {id} (method {})",
        request.amount, method.id
    );
    Ok((
        StatusCode::CREATED,
        Json(DistributionMethodView::new(method, details)),
    ))
}

async fn create_secret_word(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CreateSecretWordRequest>,
) -> Result<(StatusCode, Json<DistributionMethodView>), HttpError> {
    find_poap(&state, id).await?;
    let word = request.word.trim();
    if word.is_empty() || word.chars().count() > MAX_SECRET_WORD_LEN {
        return Err(HttpError::bad_request(format!(
            "word must be 1 to {MAX_SECRET_WORD_LEN} characters"
        )));
    }
    validate_max_claims(request.max_claims)?;
    validate_window(request.start_date, request.end_date)?;

    let txn = state.database.begin().await?;
    let method = insert_method(&txn, id, MethodKind::SecretWord).await?;
    let row = secret_word::ActiveModel {
        distribution_method_id: Set(method.id),
        word: Set(word.to_string()),
        claim_count: Set(0),
        max_claims: Set(request.max_claims),
        start_date: Set(request.start_date.map(|dt| dt.fixed_offset())),
        end_date: Set(request.end_date.map(|dt| dt.fixed_offset())),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    finish_mutation(&state, id).await?;
    info!("Created secret word method {} for POAP {id}", method.id);
    Ok((
        StatusCode::CREATED,
        Json(DistributionMethodView::new(method, row.into())),
    ))
}

async fn create_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CreateLocationRequest>,
) -> Result<(StatusCode, Json<DistributionMethodView>), HttpError> {
    find_poap(&state, id).await?;
    let center = Coordinates::new(request.latitude, request.longitude)
        .map_err(|err| HttpError::bad_request(err.to_string()))?;
    if !request.radius_meters.is_finite()
        || request.radius_meters <= 0.0
        || request.radius_meters > MAX_RADIUS_METERS
    {
        return Err(HttpError::bad_request(format!(
            "radius_meters must be greater than 0 and at most {MAX_RADIUS_METERS}"
        )));
    }
    let label = match request.label.as_deref().map(str::trim) {
        Some(label) if label.chars().count() > MAX_LABEL_LEN => {
            return Err(HttpError::bad_request(format!(
                "label must be at most {MAX_LABEL_LEN} characters"
            )));
        }
        Some(label) if !label.is_empty() => Some(label.to_string()),
        _ => None,
    };
    validate_max_claims(request.max_claims)?;
    validate_window(request.start_date, request.end_date)?;

    let txn = state.database.begin().await?;
    let method = insert_method(&txn, id, MethodKind::LocationBased).await?;
    let row = location_rule::ActiveModel {
        distribution_method_id: Set(method.id),
        label: Set(label),
        latitude: Set(center.latitude()),
        longitude: Set(center.longitude()),
        radius_meters: Set(request.radius_meters),
        claim_count: Set(0),
        max_claims: Set(request.max_claims),
        start_date: Set(request.start_date.map(|dt| dt.fixed_offset())),
        end_date: Set(request.end_date.map(|dt| dt.fixed_offset())),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    finish_mutation(&state, id).await?;
    info!("Created location method {} for POAP {id}", method.id);
    Ok((
        StatusCode::CREATED,
        Json(DistributionMethodView::new(method, row.into())),
    ))
}

async fn create_airdrop(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<CreateAirdropRequest>,
) -> Result<(StatusCode, Json<DistributionMethodView>), HttpError> {
    find_poap(&state, id).await?;
    let addresses = normalize_address_list(&request.addresses)
        .map_err(|err| HttpError::bad_request(err.to_string()))?;
    let limit = state.distribution.max_airdrop_addresses;
    if addresses.len() > limit as usize {
        return Err(HttpError::bad_request(format!(
            "Airdrop lists are limited to {limit} addresses"
        )));
    }

    let txn = state.database.begin().await?;
    let method = insert_method(&txn, id, MethodKind::Airdrop).await?;
    let row = airdrop::ActiveModel {
        distribution_method_id: Set(method.id),
        addresses: Set(json!(addresses)),
        claim_count: Set(0),
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    finish_mutation(&state, id).await?;
    info!(
        "Created airdrop method {} for POAP {id} with {} addresses",
        method.id,
        addresses.len()
    );
    Ok((
        StatusCode::CREATED,
        Json(DistributionMethodView::new(method, row.into())),
    ))
}

async fn update_method(
    State(state): State<AppState>,
    Path((id, method_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateMethodRequest>,
) -> Result<Json<DistributionMethodView>, HttpError> {
    let method = find_method(&state, id, method_id).await?;

    let mut active = method.into_active_model();
    active.disabled = Set(request.disabled);
    active.updated_at = Set(Utc::now().fixed_offset());
    let method = active.update(&state.database).await?;

    finish_mutation(&state, id).await?;
    info!(
        "Distribution method {method_id} of POAP {id} disabled={}",
        request.disabled
    );
    let details = load_details(&state.database, &method).await?;
    Ok(Json(DistributionMethodView::new(method, details)))
}

async fn delete_method(
    State(state): State<AppState>,
    Path((id, method_id)): Path<(i64, i64)>,
) -> Result<StatusCode, HttpError> {
    let method = find_method(&state, id, method_id).await?;

    let mut active = method.into_active_model();
    active.deleted = Set(true);
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(&state.database).await?;

    finish_mutation(&state, id).await?;
    info!("Deleted distribution method {method_id} of POAP {id}");
    Ok(StatusCode::NO_CONTENT)
}

async fn execute_airdrop(
    State(state): State<AppState>,
    Path((id, method_id)): Path<(i64, i64)>,
) -> Result<Json<AirdropExecutionView>, HttpError> {
    let view = ClaimProcessor::new(&state)
        .execute_airdrop(id, method_id)
        .await?;
    Ok(Json(view))
}

async fn verify_location(
    State(state): State<AppState>,
    Json(request): Json<LocationVerifyRequest>,
) -> Result<Json<LocationVerifyResponse>, HttpError> {
    let position = Coordinates::new(request.latitude, request.longitude)
        .map_err(|err| HttpError::bad_request(err.to_string()))?;
    let method = distribution_method::Entity::find_by_id(request.distribution_method_id)
        .one(&state.database)
        .await?
        .filter(|method| !method.deleted)
        .ok_or_else(|| {
            HttpError::not_found(format!(
                "Distribution method {} not found",
                request.distribution_method_id
            ))
        })?;
    if method.kind != MethodKind::LocationBased {
        return Err(HttpError::bad_request(format!(
            "Distribution method {} is not location based",
            method.id
        )));
    }

    let MethodRow::Location(rule) = load_method_row(&state.database, &method).await? else {
        return Err(HttpError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Distribution method {} has no location settings", method.id),
        ));
    };
    let center = Coordinates::new(rule.latitude, rule.longitude)
        .map_err(|err| HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()))?;
    let check = check_geofence(center, rule.radius_meters, position);

    Ok(Json(LocationVerifyResponse {
        distribution_method_id: method.id,
        in_range: check.in_range,
        distance_meters: check.distance_meters,
        radius_meters: check.radius_meters,
    }))
}

async fn find_method(
    state: &AppState,
    poap_id: i64,
    method_id: i64,
) -> Result<distribution_method::Model, HttpError> {
    find_poap(state, poap_id).await?;
    distribution_method::Entity::find_by_id(method_id)
        .one(&state.database)
        .await?
        .filter(|method| method.poap_id == poap_id && !method.deleted)
        .ok_or_else(|| HttpError::not_found(format!("Distribution method {method_id} not found")))
}

async fn insert_method(
    txn: &DatabaseTransaction,
    poap_id: i64,
    kind: MethodKind,
) -> Result<distribution_method::Model, HttpError> {
    let now = Utc::now().fixed_offset();
    let method = distribution_method::ActiveModel {
        id: NotSet,
        poap_id: Set(poap_id),
        kind: Set(kind),
        disabled: Set(false),
        deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;
    Ok(method)
}

async fn load_details<C>(
    db: &C,
    method: &distribution_method::Model,
) -> Result<MethodDetails, HttpError>
where
    C: ConnectionTrait,
{
    if method.kind == MethodKind::ClaimLinks {
        let links = claim_link::Entity::find()
            .filter(claim_link::Column::DistributionMethodId.eq(method.id))
            .order_by_asc(claim_link::Column::Id)
            .all(db)
            .await?;
        return Ok(MethodDetails::from_links(links));
    }

    let details = match load_method_row(db, method).await? {
        MethodRow::SecretWord(row) => row.into(),
        MethodRow::Location(row) => row.into(),
        MethodRow::Airdrop(row) => row.into(),
        MethodRow::Link(link) => MethodDetails::from_links(vec![link]),
    };
    Ok(details)
}

async fn finish_mutation(state: &AppState, poap_id: i64) -> Result<(), HttpError> {
    recompute_status(&state.database, poap_id).await?;
    state.cache.invalidate_poap(poap_id).await;
    Ok(())
}

fn validate_max_claims(max_claims: Option<i32>) -> Result<(), HttpError> {
    match max_claims {
        Some(max) if max <= 0 => Err(HttpError::bad_request(
            "max_claims must be greater than 0",
        )),
        _ => Ok(()),
    }
}

fn validate_window(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), HttpError> {
    match (start, end) {
        (Some(start), Some(end)) => validate_dates(start, end),
        _ => Ok(()),
    }
}

/// 128 random bits, URL safe.
fn generate_link_token() -> String {
    URL_SAFE_NO_PAD.encode(Uuid::new_v4().as_bytes())
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use serde_json::json;

    use crate::entities::poap;
    use crate::http::tests::send;
    use crate::test_support::{insert_poap, setup_db, test_state};
    use crate::wallet::tests::{ALICE, BOB};

    use super::*;

    #[test]
    fn link_tokens_are_url_safe() {
        let token = generate_link_token();
        assert_eq!(token.len(), 22);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(token, generate_link_token());
    }

    #[tokio::test]
    async fn claim_links_publish_the_poap() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        let (state, _) = test_state(db.clone());

        let uri = format!("/poaps/{}/distribution/claim-links", poap.id);
        let (status, body) = send(&state, Method::POST, &uri, Some(json!({ "amount": 3 }))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["kind"], "claim_links");
        assert_eq!(body["details"]["type"], "claim_links");
        assert_eq!(body["details"]["total_links"], 3);

        let stored = poap::Entity::find_by_id(poap.id).one(&db).await.unwrap().unwrap();
        assert_eq!(stored.status, poap::PoapStatus::Published);

        let (status, _) = send(&state, Method::POST, &uri, Some(json!({ "amount": 51 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn disable_and_delete_return_to_draft() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        let (state, _) = test_state(db.clone());

        let uri = format!("/poaps/{}/distribution/secret-word", poap.id);
        let (status, body) = send(
            &state,
            Method::POST,
            &uri,
            Some(json!({ "word": " ferris ", "max_claims": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["details"]["word"], "ferris");
        let method_uri = format!("/poaps/{}/distribution/{}", poap.id, body["id"]);

        let (status, body) = send(
            &state,
            Method::PATCH,
            &method_uri,
            Some(json!({ "disabled": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["disabled"], true);
        let stored = poap::Entity::find_by_id(poap.id).one(&db).await.unwrap().unwrap();
        assert_eq!(stored.status, poap::PoapStatus::Draft);

        let (status, _) = send(&state, Method::DELETE, &method_uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, list) = send(
            &state,
            Method::GET,
            &format!("/poaps/{}/distribution", poap.id),
            None,
        )
        .await;
        assert_eq!(list, json!([]));

        let (status, _) = send(&state, Method::DELETE, &method_uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn location_verify_reports_distance() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        let (state, _) = test_state(db);

        let uri = format!("/poaps/{}/distribution/location", poap.id);
        let (status, body) = send(
            &state,
            Method::POST,
            &uri,
            Some(json!({
                "label": "Venue",
                "latitude": 48.8584,
                "longitude": 2.2945,
                "radius_meters": 100.0
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let method_id = body["id"].clone();

        let (status, inside) = send(
            &state,
            Method::POST,
            "/distribution/location-verify",
            Some(json!({
                "distribution_method_id": method_id,
                "latitude": 48.8585,
                "longitude": 2.2945
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(inside["in_range"], true);

        let (_, outside) = send(
            &state,
            Method::POST,
            "/distribution/location-verify",
            Some(json!({
                "distribution_method_id": method_id,
                "latitude": 48.8738,
                "longitude": 2.2950
            })),
        )
        .await;
        assert_eq!(outside["in_range"], false);
        assert!(outside["distance_meters"].as_f64().unwrap() > 1_000.0);
        assert_eq!(outside["radius_meters"], 100.0);
    }

    #[tokio::test]
    async fn airdrop_rejects_bad_addresses() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        let (state, _) = test_state(db);
        let uri = format!("/poaps/{}/distribution/airdrop", poap.id);

        let (status, error) = send(
            &state,
            Method::POST,
            &uri,
            Some(json!({ "addresses": [ALICE, "not-a-wallet"] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error["error"].as_str().unwrap().contains("#2"));

        let (status, body) = send(
            &state,
            Method::POST,
            &uri,
            Some(json!({ "addresses": [ALICE, BOB, ALICE] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["details"]["addresses"], json!([ALICE, BOB]));
    }
}
