use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::auth::{Principal, TokenError};
use crate::error::ApiError;

/// One allow-list entry: an exact path, or a `prefix/**` subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PathPattern {
    Exact(String),
    Subtree(String),
}

impl PathPattern {
    fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(prefix) => PathPattern::Subtree(prefix.to_string()),
            None => PathPattern::Exact(pattern.to_string()),
        }
    }

    fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(exact) => path == exact,
            PathPattern::Subtree(prefix) => {
                path == prefix || path.strip_prefix(prefix.as_str()).is_some_and(|rest| rest.starts_with('/'))
            }
        }
    }
}

/// Paths that may be requested without a bearer token
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    patterns: Vec<PathPattern>,
}

impl AllowList {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns.into_iter().map(|p| PathPattern::parse(p.as_ref())).collect(),
        }
    }

    pub fn permits(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(path))
    }
}

/// Gate in front of every route. Allow-listed paths and CORS preflights pass
/// through; everything else needs a valid bearer token, whose principal is
/// attached to the request extensions.
pub async fn auth_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS || state.allow_list.permits(request.uri().path()) {
        return next.run(request).await;
    }

    let principal = match authenticate(&state, request.headers()) {
        Ok(principal) => principal,
        Err(err) => {
            tracing::debug!("rejected {} {}: {}", request.method(), request.uri().path(), err);
            return err.into_response();
        }
    };

    request.extensions_mut().insert(principal);
    next.run(request).await
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Principal, ApiError> {
    let token = extract_bearer(headers).map_err(ApiError::unauthorized)?;
    let claims = state.tokens.verify(token).map_err(|e| match e {
        TokenError::Expired => ApiError::unauthorized("Token has expired"),
        _ => ApiError::unauthorized("Invalid token"),
    })?;
    Principal::try_from(claims).map_err(|_| ApiError::unauthorized("Invalid token"))
}

/// Extract the token from `Authorization: Bearer <token>`
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Missing Authorization header")?;

    let auth_str = auth_header.to_str().map_err(|_| "Invalid Authorization header format")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err("Empty bearer token"),
        None => Err("Authorization header must use Bearer token format"),
    }
}
