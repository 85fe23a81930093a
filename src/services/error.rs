use thiserror::Error;

use crate::auth::{PasswordError, TokenError};
use crate::database::DatabaseError;

/// Failures raised by the domain services. Each is terminal for the request.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidCredential(String),

    #[error("{0}")]
    DuplicateResource(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Invalid(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn not_found(label: &str, id: impl std::fmt::Display) -> Self {
        ServiceError::NotFound(format!("{} {} does not exist", label, id))
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        ServiceError::Database(DatabaseError::from(err))
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::TooShort => ServiceError::Invalid(err.to_string()),
            PasswordError::Mismatch => ServiceError::InvalidCredential(err.to_string()),
            PasswordError::Hashing | PasswordError::MalformedHash => ServiceError::Internal(err.to_string()),
        }
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Generation(_) => ServiceError::Internal(err.to_string()),
            _ => ServiceError::Unauthenticated(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_mismatch_is_a_credential_error() {
        assert!(matches!(ServiceError::from(PasswordError::Mismatch), ServiceError::InvalidCredential(_)));
        assert!(matches!(ServiceError::from(PasswordError::TooShort), ServiceError::Invalid(_)));
    }

    #[test]
    fn expired_token_is_unauthenticated() {
        assert!(matches!(ServiceError::from(TokenError::Expired), ServiceError::Unauthenticated(_)));
    }

    #[test]
    fn not_found_message_names_the_resource() {
        assert_eq!(ServiceError::not_found("post", 12).to_string(), "post 12 does not exist");
    }
}
