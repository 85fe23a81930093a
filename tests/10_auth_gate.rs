use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use enjoytrip_api::auth::{Claims, Role};
use enjoytrip_api::config::AppConfig;
use enjoytrip_api::database::DatabaseManager;
use enjoytrip_api::{app, AppState};

/// Router over a pool that never connects unless a handler touches it.
fn router() -> Result<(Router, AppState)> {
    let config = AppConfig::from_env();
    let pool = DatabaseManager::connect_lazy(&config.database)?;
    let state = AppState::new(pool, config);
    Ok((app(state.clone()), state))
}

fn request(method: Method, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

#[tokio::test]
async fn protected_path_without_token_is_unauthorized() -> Result<()> {
    let (app, _) = router()?;

    let response = app.oneshot(request(Method::GET, "/api/v1/posts", None)).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
    assert_eq!(body["message"], "Missing Authorization header");
    Ok(())
}

#[tokio::test]
async fn malformed_token_is_unauthorized() -> Result<()> {
    let (app, _) = router()?;

    let response = app
        .oneshot(request(Method::GET, "/api/v1/users/me", Some("not.a.jwt")))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "Invalid token");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_unauthorized() -> Result<()> {
    let (app, state) = router()?;
    let claims = Claims::new(1, "traveler@example.com", Role::User, Duration::hours(-2));
    let token = state.tokens.encode(&claims)?;

    let response = app.oneshot(request(Method::GET, "/api/v1/users/me", Some(&token))).await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "Token has expired");
    Ok(())
}

#[tokio::test]
async fn valid_token_reaches_the_handler() -> Result<()> {
    let (app, state) = router()?;
    let token = state.tokens.issue(1, "traveler@example.com", Role::User)?.access_token;

    // The path parameter is rejected by the handler, proving the gate let the request through
    let response = app
        .oneshot(request(Method::GET, "/api/v1/posts/not-a-number", Some(&token)))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "BAD_REQUEST");
    Ok(())
}

#[tokio::test]
async fn allow_listed_paths_skip_the_gate() -> Result<()> {
    let (app, _) = router()?;

    let response = app.clone().oneshot(request(Method::GET, "/", None)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["name"], "EnjoyTrip API");

    let response = app.oneshot(request(Method::GET, "/api/v1/tours/not-a-number", None)).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn preflight_requests_are_not_challenged() -> Result<()> {
    let (app, _) = router()?;

    let response = app.oneshot(request(Method::OPTIONS, "/api/v1/posts", None)).await?;
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
