use axum::{extract::State, http::HeaderMap};

use crate::app::AppState;
use crate::auth::Token;
use crate::error::ApiError;
use crate::handlers::Identified;
use crate::middleware::auth::extract_bearer;
use crate::middleware::{ApiResponse, ApiResult, JsonBody};
use crate::services::user_service::{LoginRequest, SignupRequest};

/// POST /api/v1/users/join - Register a new account
///
/// Fails with 409 when the email is already registered.
pub async fn join(State(state): State<AppState>, JsonBody(request): JsonBody<SignupRequest>) -> ApiResult<Identified> {
    let id = state.users.signup(request).await?;
    Ok(ApiResponse::created(id.into()))
}

/// POST /api/v1/users/login - Exchange credentials for a bearer token
///
/// ```json
/// { "grant_type": "Bearer", "access_token": "eyJhbGciOiJIUzI1NiI...", "expires_in": 86400 }
/// ```
pub async fn login(State(state): State<AppState>, JsonBody(request): JsonBody<LoginRequest>) -> ApiResult<Token> {
    Ok(ApiResponse::success(state.users.login(request).await?))
}

/// POST /api/v1/users/refresh-token - Reissue a token from a recently expired one
///
/// The old token travels in the `Authorization` header like any other request.
pub async fn refresh_token(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Token> {
    let token = extract_bearer(&headers).map_err(ApiError::unauthorized)?;
    Ok(ApiResponse::success(state.users.refresh(token).await?))
}
