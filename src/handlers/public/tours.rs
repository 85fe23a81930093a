use axum::extract::State;

use crate::app::AppState;
use crate::database::models::AttractionInfo;
use crate::middleware::{ApiResponse, ApiResult, PathParam, QueryParams};
use crate::services::tour_service::TourQuery;

/// GET /api/v1/tours?sido_code=&gugun_code=&content_type_id=
pub async fn search(State(state): State<AppState>, QueryParams(query): QueryParams<TourQuery>) -> ApiResult<Vec<AttractionInfo>> {
    Ok(ApiResponse::success(state.tours.search(query).await?))
}

/// GET /api/v1/tours/:content_id
pub async fn detail(State(state): State<AppState>, PathParam(content_id): PathParam<i32>) -> ApiResult<AttractionInfo> {
    Ok(ApiResponse::success(state.tours.get(content_id).await?))
}
