use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use sea_orm::DbErr;
use serde::Serialize;
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::claims::ClaimError;
use crate::eligibility::ClaimRejection;
use crate::state::AppState;

mod analytics;
mod claims;
mod distribution;
mod poaps;
mod wallets;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .route("/health", get(health_live))
        .route("/health/ready", get(health_ready))
        .merge(poaps::router())
        .merge(distribution::router())
        .merge(claims::router())
        .merge(analytics::router())
        .merge(wallets::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_live(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "live",
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

async fn health_ready(State(state): State<AppState>) -> Result<Json<ReadyResponse>, HttpError> {
    state
        .database
        .ping()
        .await
        .map_err(|err| HttpError::new(StatusCode::SERVICE_UNAVAILABLE, err.to_string()))?;

    let minter_timeout_ms =
        u64::try_from(state.minter.timeout().as_millis()).unwrap_or(u64::MAX);

    let response = ReadyResponse {
        status: "ready",
        minter_timeout_ms,
        cache_entries: CacheSummary {
            poap_analytics: state.cache.poap_analytics.entry_count(),
            overview_analytics: state.cache.overview_analytics.entry_count(),
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
struct ReadyResponse {
    status: &'static str,
    minter_timeout_ms: u64,
    cache_entries: CacheSummary,
}

#[derive(Debug, Serialize)]
struct CacheSummary {
    poap_analytics: u64,
    overview_analytics: u64,
}

#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    details: Option<Value>,
}

impl HttpError {
    pub fn new(status: StatusCode, message: String) -> Self {
        assert!(status != StatusCode::OK, "Error status cannot be 200");
        assert!(!message.is_empty(), "Error message cannot be empty");
        Self {
            status,
            message,
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into())
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!("HTTP {}: {}", self.status.as_u16(), self.message);
        } else {
            info!("HTTP {}: {}", self.status.as_u16(), self.message);
        }
        let body = Json(ErrorBody {
            error: self.message,
            details: self.details,
        });
        (self.status, body).into_response()
    }
}

impl From<DbErr> for HttpError {
    fn from(err: DbErr) -> Self {
        HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

impl From<ClaimRejection> for HttpError {
    fn from(rejection: ClaimRejection) -> Self {
        let status = match &rejection {
            ClaimRejection::AlreadyClaimed | ClaimRejection::LinkAlreadyUsed => {
                StatusCode::CONFLICT
            }
            ClaimRejection::WrongMethod { .. } | ClaimRejection::IncorrectSecretWord => {
                StatusCode::BAD_REQUEST
            }
            ClaimRejection::MethodUnavailable
            | ClaimRejection::NotYetActive { .. }
            | ClaimRejection::Expired { .. }
            | ClaimRejection::MaxClaimsReached { .. }
            | ClaimRejection::OutOfRange { .. }
            | ClaimRejection::NotOnAirdropList => StatusCode::FORBIDDEN,
        };
        let error = HttpError::new(status, rejection.to_string());
        match rejection {
            ClaimRejection::OutOfRange {
                distance_meters,
                radius_meters,
            } => error.with_details(json!({
                "distance_meters": distance_meters,
                "radius_meters": radius_meters,
            })),
            _ => error,
        }
    }
}

impl From<ClaimError> for HttpError {
    fn from(err: ClaimError) -> Self {
        let message = err.to_string();
        match err {
            ClaimError::Rejected(rejection) => rejection.into(),
            ClaimError::InvalidRequest(_) => HttpError::bad_request(message),
            ClaimError::NotFound(_) => HttpError::not_found(message),
            ClaimError::TokenMissing(_) => HttpError::conflict(message),
            ClaimError::Transfer(_) => HttpError::new(StatusCode::BAD_GATEWAY, message),
            ClaimError::Inconsistent(_) | ClaimError::Database(_) => {
                HttpError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}
