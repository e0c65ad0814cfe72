use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};

use crate::claims::{ClaimProcessor, ClaimReceipt, ClaimSubmission};
use crate::entities::{claim_link, distribution_method, poap, poap_claim};
use crate::geo::Coordinates;
use crate::models::claim::{
    AirdropClaimRequest, ClaimLinkLookupView, ClaimLinkRequest, ClaimReceiptView,
    ClaimStatusView, ClaimView, LocationClaimRequest, SecretWordClaimRequest,
};
use crate::state::AppState;
use crate::wallet::sanitize_wallet_address;

use super::HttpError;
use super::poaps::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, find_poap};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/claim-links/{token}", get(lookup_claim_link))
        .route("/poaps/{id}/claim/link", post(claim_with_link))
        .route("/poaps/{id}/claim/secret-word", post(claim_with_secret_word))
        .route("/poaps/{id}/claim/location", post(claim_with_location))
        .route("/poaps/{id}/claim/airdrop", post(claim_from_airdrop))
        .route("/poaps/{id}/claims", get(list_claims))
        .route("/poaps/{id}/claims/{wallet}", get(claim_status))
}

#[derive(Debug, Default, Deserialize)]
pub struct ClaimListQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ClaimListResponse {
    pub poap_id: i64,
    pub claims: Vec<ClaimView>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

async fn lookup_claim_link(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<ClaimLinkLookupView>, HttpError> {
    let not_found = || HttpError::not_found("Claim link not found");
    let link = claim_link::Entity::find()
        .filter(claim_link::Column::Token.eq(token.trim()))
        .one(&state.database)
        .await?
        .ok_or_else(not_found)?;
    let method = distribution_method::Entity::find_by_id(link.distribution_method_id)
        .one(&state.database)
        .await?
        .ok_or_else(not_found)?;
    let poap = poap::Entity::find_by_id(method.poap_id)
        .one(&state.database)
        .await?
        .ok_or_else(not_found)?;

    let expires_at = link.expires_at.map(|dt| dt.with_timezone(&Utc));
    let expired = expires_at.is_some_and(|at| Utc::now() > at);
    Ok(Json(ClaimLinkLookupView {
        token: link.token,
        poap: poap.into(),
        claimed: link.claimed,
        claimed_by: link.claimed_by,
        expired,
        expires_at,
        available: !link.claimed && !expired && method.is_active(),
    }))
}

async fn claim_with_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ClaimLinkRequest>,
) -> Result<(StatusCode, Json<ClaimReceiptView>), HttpError> {
    let submission = ClaimSubmission::Link {
        token: request.token,
    };
    submit(&state, id, &request.wallet_address, submission).await
}

async fn claim_with_secret_word(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<SecretWordClaimRequest>,
) -> Result<(StatusCode, Json<ClaimReceiptView>), HttpError> {
    let submission = ClaimSubmission::SecretWord {
        method_id: request.distribution_method_id,
        word: request.word,
    };
    submit(&state, id, &request.wallet_address, submission).await
}

async fn claim_with_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<LocationClaimRequest>,
) -> Result<(StatusCode, Json<ClaimReceiptView>), HttpError> {
    let position = Coordinates::new(request.latitude, request.longitude)
        .map_err(|err| HttpError::bad_request(err.to_string()))?;
    let submission = ClaimSubmission::Location {
        method_id: request.distribution_method_id,
        position,
    };
    submit(&state, id, &request.wallet_address, submission).await
}

async fn claim_from_airdrop(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<AirdropClaimRequest>,
) -> Result<(StatusCode, Json<ClaimReceiptView>), HttpError> {
    let submission = ClaimSubmission::Airdrop {
        method_id: request.distribution_method_id,
    };
    submit(&state, id, &request.wallet_address, submission).await
}

async fn submit(
    state: &AppState,
    poap_id: i64,
    wallet_address: &str,
    submission: ClaimSubmission,
) -> Result<(StatusCode, Json<ClaimReceiptView>), HttpError> {
    let ClaimReceipt {
        claim,
        mint_address,
        distance_meters,
    } = ClaimProcessor::new(state)
        .claim(poap_id, wallet_address, submission)
        .await?;

    let view = ClaimReceiptView {
        success: true,
        message: format!("POAP {poap_id} claimed"),
        claim: claim.into(),
        mint_address,
        distance_meters,
    };
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_claims(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ClaimListQuery>,
) -> Result<Json<ClaimListResponse>, HttpError> {
    find_poap(&state, id).await?;
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    let select = poap_claim::Entity::find().filter(poap_claim::Column::PoapId.eq(id));
    let total = select.clone().count(&state.database).await?;
    let claims = select
        .order_by_desc(poap_claim::Column::ClaimedAt)
        .order_by_asc(poap_claim::Column::WalletAddress)
        .limit(limit)
        .offset(offset)
        .all(&state.database)
        .await?
        .into_iter()
        .map(ClaimView::from)
        .collect();

    Ok(Json(ClaimListResponse {
        poap_id: id,
        claims,
        total,
        limit,
        offset,
    }))
}

async fn claim_status(
    State(state): State<AppState>,
    Path((id, wallet)): Path<(i64, String)>,
) -> Result<Json<ClaimStatusView>, HttpError> {
    let wallet =
        sanitize_wallet_address(&wallet).map_err(|err| HttpError::bad_request(err.to_string()))?;
    find_poap(&state, id).await?;
    let claim = poap_claim::Entity::find_by_id((id, wallet.clone()))
        .one(&state.database)
        .await?;

    Ok(Json(ClaimStatusView {
        poap_id: id,
        wallet_address: wallet,
        claimed: claim.is_some(),
        claim: claim.map(ClaimView::from),
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::Method;
    use chrono::Duration;
    use sea_orm::ActiveModelTrait;
    use sea_orm::ActiveValue::{NotSet, Set};
    use serde_json::json;

    use crate::entities::distribution_method::MethodKind;
    use crate::http::tests::send;
    use crate::test_support::{
        MINT, insert_method, insert_poap, insert_secret_word, insert_token, setup_db, test_state,
    };
    use crate::wallet::tests::{ALICE, BOB};

    use super::*;

    #[tokio::test]
    async fn secret_word_claim_flow() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        insert_secret_word(&db, poap.id, "ferris", None).await;
        let (state, _) = test_state(db);
        let uri = format!("/poaps/{}/claim/secret-word", poap.id);

        let (status, error) = send(
            &state,
            Method::POST,
            &uri,
            Some(json!({ "wallet_address": ALICE, "word": "crab" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error["error"].is_string());

        let (status, receipt) = send(
            &state,
            Method::POST,
            &uri,
            Some(json!({ "wallet_address": ALICE, "word": " ferris " })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(receipt["success"], true);
        assert_eq!(receipt["mint_address"], MINT);
        assert_eq!(receipt["claim"]["method_kind"], "secret_word");

        let (status, _) = send(
            &state,
            Method::POST,
            &uri,
            Some(json!({ "wallet_address": ALICE, "word": "ferris" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, claimed) = send(
            &state,
            Method::GET,
            &format!("/poaps/{}/claims/{ALICE}", poap.id),
            None,
        )
        .await;
        assert_eq!(claimed["claimed"], true);
        let (_, unclaimed) = send(
            &state,
            Method::GET,
            &format!("/poaps/{}/claims/{BOB}", poap.id),
            None,
        )
        .await;
        assert_eq!(unclaimed["claimed"], false);

        let (_, list) = send(
            &state,
            Method::GET,
            &format!("/poaps/{}/claims", poap.id),
            None,
        )
        .await;
        assert_eq!(list["total"], 1);

        let (status, _) = send(
            &state,
            Method::DELETE,
            &format!("/poaps/{}", poap.id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn location_claim_outside_radius_reports_distance() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        let method = insert_method(&db, poap.id, MethodKind::LocationBased).await;
        crate::entities::location_rule::ActiveModel {
            distribution_method_id: Set(method.id),
            label: Set(Some("Venue".to_string())),
            latitude: Set(51.5007),
            longitude: Set(-0.1246),
            radius_meters: Set(200.0),
            claim_count: Set(0),
            max_claims: Set(None),
            start_date: Set(None),
            end_date: Set(None),
        }
        .insert(&db)
        .await
        .unwrap();
        let (state, _) = test_state(db);
        let uri = format!("/poaps/{}/claim/location", poap.id);

        let (status, error) = send(
            &state,
            Method::POST,
            &uri,
            Some(json!({ "wallet_address": ALICE, "latitude": 51.5155, "longitude": -0.1246 })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(error["details"]["distance_meters"].as_f64().unwrap() > 1_500.0);
        assert_eq!(error["details"]["radius_meters"], 200.0);

        let (status, receipt) = send(
            &state,
            Method::POST,
            &uri,
            Some(json!({ "wallet_address": ALICE, "latitude": 51.5008, "longitude": -0.1246 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(receipt["distance_meters"].as_f64().unwrap() < 200.0);
    }

    #[tokio::test]
    async fn claim_link_lookup_and_redeem() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        let method = insert_method(&db, poap.id, MethodKind::ClaimLinks).await;
        claim_link::ActiveModel {
            id: NotSet,
            distribution_method_id: Set(method.id),
            token: Set("door-prize".to_string()),
            expires_at: Set(Some((Utc::now() + Duration::days(1)).fixed_offset())),
            claimed: Set(false),
            claimed_by: Set(None),
            claimed_at: Set(None),
        }
        .insert(&db)
        .await
        .unwrap();
        let (state, _) = test_state(db);

        let (status, lookup) = send(&state, Method::GET, "/claim-links/door-prize", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(lookup["available"], true);
        assert_eq!(lookup["poap"]["id"], poap.id);

        let uri = format!("/poaps/{}/claim/link", poap.id);
        let body = |wallet: &str| Some(json!({ "token": "door-prize", "wallet_address": wallet }));
        let (status, _) = send(&state, Method::POST, &uri, body(ALICE)).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = send(&state, Method::POST, &uri, body(BOB)).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, lookup) = send(&state, Method::GET, "/claim-links/door-prize", None).await;
        assert_eq!(lookup["claimed"], true);
        assert_eq!(lookup["claimed_by"], ALICE);
        assert_eq!(lookup["available"], false);

        let (status, _) = send(&state, Method::GET, "/claim-links/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn disabled_method_rejects_claims() {
        let db = setup_db().await;
        let poap = insert_poap(&db).await;
        insert_token(&db, poap.id).await;
        let method = insert_secret_word(&db, poap.id, "ferris", None).await;
        let (state, _) = test_state(db);

        let method_uri = format!("/poaps/{}/distribution/{}", poap.id, method.id);
        let (status, _) = send(
            &state,
            Method::PATCH,
            &method_uri,
            Some(json!({ "disabled": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &state,
            Method::POST,
            &format!("/poaps/{}/claim/secret-word", poap.id),
            Some(json!({ "wallet_address": ALICE, "word": "ferris" })),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
