use super::{ApiError, AppState};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest};
use crate::services::Identity;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest, HttpResponse};
use std::future::{ready, Ready};
use validator::Validate;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/auth/register", web::post().to(register))
        .route("/auth/login", web::post().to(login));
}

/// Caller identity from a verified `Authorization: Bearer` token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl AuthenticatedUser {
    pub fn user_id(&self) -> i64 {
        self.0.user_id
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::internal("application state missing"))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Authorization header required"))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::unauthorized("Invalid authorization format. Use: Bearer <token>"))?;

    let identity = state.auth.verify_token(token).map_err(|e| {
        tracing::debug!("Rejected token on {}: {}", req.path(), e);
        ApiError::unauthorized("Invalid or expired token")
    })?;

    Ok(AuthenticatedUser(identity))
}

/// Register endpoint
///
/// POST /api/v1/auth/register
///
/// Request body:
/// ```json
/// { "name": "string", "email": "string", "password": "string" }
/// ```
async fn register(
    state: web::Data<AppState>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(ApiError::validation)?;

    let req = req.into_inner();
    let email = req.email.trim().to_lowercase();

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::new(
            actix_web::http::StatusCode::CONFLICT,
            "User already exists",
            format!("an account for {} already exists", email),
        ));
    }

    let auth = state.auth.clone();
    let password = req.password;
    let password_hash = web::block(move || auth.hash_password(&password))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))??;

    let user = state.store.create_user(req.name.trim(), &email, &password_hash).await?;
    let token = state.auth.issue_token(user.id, &user.email)?;

    tracing::info!("Registered user {}", user.id);

    Ok(HttpResponse::Created().json(AuthResponse {
        user_id: user.id,
        token,
    }))
}

/// Login endpoint
///
/// POST /api/v1/auth/login
///
/// Request body:
/// ```json
/// { "email": "string", "password": "string" }
/// ```
async fn login(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    req.validate().map_err(ApiError::validation)?;

    let req = req.into_inner();
    let email = req.email.trim().to_lowercase();

    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let auth = state.auth.clone();
    let password = req.password;
    let hash = user.password_hash.clone();
    let matches = web::block(move || auth.verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::internal(e.to_string()))??;

    if !matches {
        tracing::info!("Password mismatch for user {}", user.id);
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let token = state.auth.issue_token(user.id, &user.email)?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        user_id: user.id,
        token,
    }))
}
