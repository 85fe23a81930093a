use axum::extract::State;

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::CommentBody;
use crate::handlers::Identified;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, PathParam};
use crate::services::comment_service::CommentView;

/// GET /api/v1/posts/:id/comments
pub async fn list(State(state): State<AppState>, PathParam(post_id): PathParam<i64>) -> ApiResult<Vec<CommentView>> {
    Ok(ApiResponse::success(state.comments.list(post_id).await?))
}

/// POST /api/v1/posts/:id/comments
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    PathParam(post_id): PathParam<i64>,
    JsonBody(body): JsonBody<CommentBody>,
) -> ApiResult<Identified> {
    let id = state.comments.create(post_id, body, &principal).await?;
    Ok(ApiResponse::created(id.into()))
}

/// PUT /api/v1/comments/:id
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    PathParam(id): PathParam<i64>,
    JsonBody(body): JsonBody<CommentBody>,
) -> ApiResult<Identified> {
    let id = state.comments.update(id, body, &principal).await?;
    Ok(ApiResponse::success(id.into()))
}

/// DELETE /api/v1/comments/:id
pub async fn remove(State(state): State<AppState>, principal: Principal, PathParam(id): PathParam<i64>) -> ApiResult<()> {
    state.comments.delete(id, &principal).await?;
    Ok(ApiResponse::no_content())
}
