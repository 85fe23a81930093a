use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::post_service::PostSummary;

/// GET / - Service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "EnjoyTrip API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Travel community backend: posts, hot places, trip recruitment and attraction lookup",
            "endpoints": {
                "users": "/api/v1/users/* (join, login and refresh-token are public)",
                "posts": "/api/v1/posts[/:id] (home is public)",
                "comments": "/api/v1/posts/:id/comments, /api/v1/comments/:id",
                "hot_places": "/api/v1/hot-places[/:id]",
                "recruitments": "/api/v1/recruitments[/:id[/participants]]",
                "tours": "/api/v1/tours[/:content_id] (public)",
            }
        }
    }))
}

/// GET /health - Database round trip
pub async fn health(State(state): State<AppState>) -> ApiResult<Value> {
    match DatabaseManager::health_check(&state.pool).await {
        Ok(()) => Ok(ApiResponse::success(json!({
            "status": "ok",
            "timestamp": chrono::Utc::now(),
            "database": "ok"
        }))),
        Err(e) => {
            tracing::warn!("health check failed: {}", e);
            Err(ApiError::service_unavailable("database unavailable"))
        }
    }
}

/// GET /api/v1/posts/home - Landing page excerpt of the board
pub async fn posts_home(State(state): State<AppState>) -> ApiResult<Vec<PostSummary>> {
    Ok(ApiResponse::success(state.posts.home().await?))
}
