use axum::extract::State;

use crate::app::AppState;
use crate::auth::Principal;
use crate::database::models::{NewRecruitment, RecruitmentPatch};
use crate::handlers::Identified;
use crate::middleware::{ApiResponse, ApiResult, JsonBody, PathParam};
use crate::services::recruitment_service::{ParticipantView, RecruitmentDetail, RecruitmentSummary};

/// GET /api/v1/recruitments - With current head counts
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<RecruitmentSummary>> {
    Ok(ApiResponse::success(state.recruitments.list().await?))
}

/// POST /api/v1/recruitments
pub async fn create(
    State(state): State<AppState>,
    principal: Principal,
    JsonBody(input): JsonBody<NewRecruitment>,
) -> ApiResult<Identified> {
    let id = state.recruitments.create(input, &principal).await?;
    Ok(ApiResponse::created(id.into()))
}

/// GET /api/v1/recruitments/:id - Includes the participant list
pub async fn detail(State(state): State<AppState>, PathParam(id): PathParam<i64>) -> ApiResult<RecruitmentDetail> {
    Ok(ApiResponse::success(state.recruitments.get(id).await?))
}

/// PUT /api/v1/recruitments/:id
pub async fn update(
    State(state): State<AppState>,
    principal: Principal,
    PathParam(id): PathParam<i64>,
    JsonBody(patch): JsonBody<RecruitmentPatch>,
) -> ApiResult<Identified> {
    let id = state.recruitments.update(id, patch, &principal).await?;
    Ok(ApiResponse::success(id.into()))
}

/// DELETE /api/v1/recruitments/:id
pub async fn remove(State(state): State<AppState>, principal: Principal, PathParam(id): PathParam<i64>) -> ApiResult<()> {
    state.recruitments.delete(id, &principal).await?;
    Ok(ApiResponse::no_content())
}

/// GET /api/v1/recruitments/:id/participants
pub async fn participants(State(state): State<AppState>, PathParam(id): PathParam<i64>) -> ApiResult<Vec<ParticipantView>> {
    Ok(ApiResponse::success(state.recruitments.participants(id).await?))
}

/// POST /api/v1/recruitments/:id/participants - 409 when closed, full or already joined
pub async fn join(State(state): State<AppState>, principal: Principal, PathParam(id): PathParam<i64>) -> ApiResult<Identified> {
    state.recruitments.join(id, &principal).await?;
    Ok(ApiResponse::created(id.into()))
}

/// DELETE /api/v1/recruitments/:id/participants
pub async fn leave(State(state): State<AppState>, principal: Principal, PathParam(id): PathParam<i64>) -> ApiResult<()> {
    state.recruitments.leave(id, &principal).await?;
    Ok(ApiResponse::no_content())
}
