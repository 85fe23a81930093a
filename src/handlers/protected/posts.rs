use axum::extract::State;
use serde_json::{json, Value};

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::{NewPost, PostPatch};
use crate::database::PageQuery;
use crate::handlers::Identified;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, PathParam, QueryParams};
use crate::services::post_service::{LikeStatus, Liker, PostDetail, PostSummary};

/// GET /api/v1/posts?page=&keyword= - One board page, notices pinned on top
pub async fn list(State(state): State<AppState>, QueryParams(query): QueryParams<PageQuery>) -> ApiResult<Vec<PostSummary>> {
    Ok(ApiResponse::success(state.posts.list(&query).await?))
}

/// GET /api/v1/posts/page-count?keyword=
pub async fn page_count(State(state): State<AppState>, QueryParams(query): QueryParams<PageQuery>) -> ApiResult<Value> {
    let pages = state.posts.page_count(query.keyword.as_deref()).await?;
    Ok(ApiResponse::success(json!({ "page_count": pages })))
}

/// POST /api/v1/posts
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    JsonBody(input): JsonBody<NewPost>,
) -> ApiResult<Identified> {
    let id = state.posts.create(input, &principal).await?;
    Ok(ApiResponse::created(id.into()))
}

/// GET /api/v1/posts/:id - Counts one view
pub async fn detail(State(state): State<AppState>, principal: Principal, PathParam(id): PathParam<i64>) -> ApiResult<PostDetail> {
    Ok(ApiResponse::success(state.posts.get(id, &principal).await?))
}

/// PUT /api/v1/posts/:id
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    PathParam(id): PathParam<i64>,
    JsonBody(patch): JsonBody<PostPatch>,
) -> ApiResult<Identified> {
    let id = state.posts.update(id, patch, &principal).await?;
    Ok(ApiResponse::success(id.into()))
}

/// DELETE /api/v1/posts/:id - Comments and likes go with the post
pub async fn remove(State(state): State<AppState>, principal: Principal, PathParam(id): PathParam<i64>) -> ApiResult<()> {
    state.posts.delete(id, &principal).await?;
    Ok(ApiResponse::no_content())
}

/// POST /api/v1/posts/:id/like
pub async fn toggle_like(State(state): State<AppState>, principal: Principal, PathParam(id): PathParam<i64>) -> ApiResult<LikeStatus> {
    Ok(ApiResponse::success(state.posts.toggle_like(id, &principal).await?))
}

/// GET /api/v1/posts/:id/likes
pub async fn likers(State(state): State<AppState>, PathParam(id): PathParam<i64>) -> ApiResult<Vec<Liker>> {
    Ok(ApiResponse::success(state.posts.likers(id).await?))
}

/// PUT /api/v1/posts/:id/notice - Administrators only
pub async fn toggle_notice(State(state): State<AppState>, principal: Principal, PathParam(id): PathParam<i64>) -> ApiResult<Value> {
    let is_notice = state.posts.toggle_notice(id, &principal).await?;
    Ok(ApiResponse::success(json!({ "id": id, "is_notice": is_notice })))
}
