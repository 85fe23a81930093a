use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::UserPatch;
use crate::handlers::Identified;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, PathParam};
use crate::services::user_service::{PasswordChange, PasswordCheck, UserProfile};

/// GET /api/v1/users/me - Profile of the token holder
pub async fn me(State(state): State<AppState>, principal: Principal) -> ApiResult<UserProfile> {
    Ok(ApiResponse::success(state.users.profile(principal.user_id).await?))
}

/// GET /api/v1/users/:id
pub async fn profile(State(state): State<AppState>, PathParam(id): PathParam<i64>) -> ApiResult<UserProfile> {
    Ok(ApiResponse::success(state.users.profile(id).await?))
}

/// PUT /api/v1/users/:id - Edit nickname or profile image; self only
///
/// Sending `"image_file_name": null` clears the image, omitting it keeps it.
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    PathParam(id): PathParam<i64>,
    JsonBody(patch): JsonBody<UserPatch>,
) -> ApiResult<Identified> {
    let id = state.users.update(id, patch, &principal).await?;
    Ok(ApiResponse::success(id.into()))
}

/// DELETE /api/v1/users/:id - Close the account and everything it owns
pub async fn remove(State(state): State<AppState>, principal: Principal, PathParam(id): PathParam<i64>) -> ApiResult<()> {
    state.users.delete(id, &principal).await?;
    Ok(ApiResponse::no_content())
}

/// POST /api/v1/users/password-check - Confirm the caller's current password
pub async fn password_check(
    State(state): State<AppState>,
    principal: Principal,
    JsonBody(request): JsonBody<PasswordCheck>,
) -> ApiResult<Value> {
    state.users.check_password(&principal, request).await?;
    Ok(ApiResponse::success(json!({ "matches": true })))
}

/// PUT /api/v1/users/:id/password
pub async fn change_password(
    State(state): State<AppState>,
    principal: Principal,
    PathParam(id): PathParam<i64>,
    JsonBody(request): JsonBody<PasswordChange>,
) -> ApiResult<()> {
    state.users.change_password(id, request, &principal).await?;
    Ok(ApiResponse::no_content())
}
