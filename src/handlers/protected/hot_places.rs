use axum::extract::State;

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::{HotPlacePatch, NewHotPlace};
use crate::handlers::Identified;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, PathParam};
use crate::services::hot_place_service::{HotPlaceDetail, HotPlaceSummary};

/// GET /api/v1/hot-places
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<HotPlaceSummary>> {
    Ok(ApiResponse::success(state.hot_places.list().await?))
}

/// POST /api/v1/hot-places
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    JsonBody(input): JsonBody<NewHotPlace>,
) -> ApiResult<Identified> {
    let id = state.hot_places.create(input, &principal).await?;
    Ok(ApiResponse::created(id.into()))
}

/// GET /api/v1/hot-places/:id - Counts one view
pub async fn detail(State(state): State<AppState>, PathParam(id): PathParam<i64>) -> ApiResult<HotPlaceDetail> {
    Ok(ApiResponse::success(state.hot_places.get(id).await?))
}

/// PUT /api/v1/hot-places/:id
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    PathParam(id): PathParam<i64>,
    JsonBody(patch): JsonBody<HotPlacePatch>,
) -> ApiResult<Identified> {
    let id = state.hot_places.update(id, patch, &principal).await?;
    Ok(ApiResponse::success(id.into()))
}

/// DELETE /api/v1/hot-places/:id
pub async fn remove(State(state): State<AppState>, principal: Principal, PathParam(id): PathParam<i64>) -> ApiResult<()> {
    state.hot_places.delete(id, &principal).await?;
    Ok(ApiResponse::no_content())
}
