use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;
use crate::services::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Role::User),
            "ROLE_ADMIN" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Authenticated identity attached to a request by the auth gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub email: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Principal>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Anything recorded as belonging to a user
pub trait Owned {
    /// Human-readable name used in error messages
    const LABEL: &'static str;

    fn owner_id(&self) -> i64;
}

/// Relation the principal must hold to the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Owner,
    Admin,
}

pub fn authorize<T: Owned>(resource: &T, principal: &Principal, relation: Relation) -> Result<(), ServiceError> {
    match relation {
        Relation::Owner if resource.owner_id() == principal.user_id => Ok(()),
        Relation::Owner => {
            tracing::warn!(
                "user {} denied: not the owner of {} (owner {})",
                principal.user_id,
                T::LABEL,
                resource.owner_id()
            );
            Err(ServiceError::Forbidden(format!("Only the author can modify this {}", T::LABEL)))
        }
        Relation::Admin if principal.is_admin() => Ok(()),
        Relation::Admin => {
            tracing::warn!("user {} denied: administrator role required on {}", principal.user_id, T::LABEL);
            Err(ServiceError::Forbidden("Administrator role required".to_string()))
        }
    }
}
