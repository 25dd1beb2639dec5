// Route exports
pub mod auth;
pub mod bookings;
pub mod properties;

use crate::core::{BookingError, FetchStage, RecommendError, Recommender};
use crate::models::{ErrorResponse, HealthResponse};
use crate::services::{AuthError, AuthService, PostgresClient, RankingError, StoreError};
use actix_web::{error, http::StatusCode, web, HttpResponse};
use std::fmt;
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<PostgresClient>,
    pub recommender: Recommender,
    pub auth: Arc<AuthService>,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(auth::configure)
            .configure(properties::configure)
            .configure(bookings::configure),
    );
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let pg_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// JSON error returned by every handler and extractor
#[derive(Debug, Clone)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad request", message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal error", message)
    }

    pub fn validation(errors: validator::ValidationErrors) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for ApiError {}

impl error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(ErrorResponse {
            error: self.error.clone(),
            message: self.message.clone(),
            status_code: self.status.as_u16(),
        })
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::new(StatusCode::NOT_FOUND, "Not found", what),
            StoreError::Conflict(msg) => ApiError::new(StatusCode::CONFLICT, "Conflict", msg),
            StoreError::InvalidInput(msg) => ApiError::bad_request(msg),
            other => {
                tracing::error!("Storage failure: {}", other);
                ApiError::internal(other.to_string())
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::HashError(e) => {
                tracing::error!("Password hashing failed: {}", e);
                ApiError::internal("failed to process credentials")
            }
            other => ApiError::unauthorized(other.to_string()),
        }
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<RecommendError> for ApiError {
    fn from(err: RecommendError) -> Self {
        let message = err.to_string();
        match err {
            RecommendError::DependencyFetch {
                stage: FetchStage::Preferences,
                source: StoreError::NotFound(_),
            } => ApiError::new(
                StatusCode::NOT_FOUND,
                "Preferences not found",
                "save housing preferences before requesting recommendations",
            ),
            RecommendError::DependencyFetch { .. } => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load recommendation data", message)
            }
            RecommendError::RankingCall(RankingError::Timeout(_)) => {
                ApiError::new(StatusCode::GATEWAY_TIMEOUT, "Ranking service timed out", message)
            }
            RecommendError::RankingCall(_) => {
                ApiError::new(StatusCode::BAD_GATEWAY, "Ranking service failed", message)
            }
            RecommendError::MalformedIdentifier(_) => {
                ApiError::new(StatusCode::BAD_GATEWAY, "Malformed ranking response", message)
            }
        }
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::new(StatusCode::BAD_REQUEST, "invalid_json", format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    ApiError::new(StatusCode::BAD_REQUEST, "invalid_query", format!("Invalid query: {}", err)).into()
}
