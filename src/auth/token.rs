use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::principal::{Principal, Role};
use crate::config::SecurityConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64, email: impl Into<String>, role: Role, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            email: email.into(),
            role,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn user_id(&self) -> Result<i64, TokenError> {
        self.sub.parse().map_err(|_| TokenError::Invalid("subject is not a user id".to_string()))
    }
}

impl TryFrom<Claims> for Principal {
    type Error = TokenError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: claims.user_id()?,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("JWT generation error: {0}")]
    Generation(String),

    #[error("Token has expired")]
    Expired,

    #[error("Token is past its refresh window")]
    RefreshWindowElapsed,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Bearer credential returned by login and refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub grant_type: String,
    pub access_token: String,
    pub expires_in: i64,
}

/// Signs and verifies HS256 access tokens
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    refresh_window: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration, refresh_window: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            refresh_window,
        }
    }

    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(
            &config.jwt_secret,
            Duration::hours(config.jwt_expiry_hours as i64),
            Duration::hours(config.refresh_window_hours as i64),
        )
    }

    pub fn issue(&self, user_id: i64, email: &str, role: Role) -> Result<Token, TokenError> {
        let claims = Claims::new(user_id, email, role, self.ttl);
        Ok(Token {
            grant_type: "Bearer".to_string(),
            access_token: self.encode(&claims)?,
            expires_in: self.ttl.num_seconds(),
        })
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.encoding).map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Validate signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            })
    }

    /// Validate signature only, then require expiry to fall inside the refresh window.
    pub fn verify_for_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.validate_exp = false;

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;

        if claims.exp + self.refresh_window.num_seconds() < Utc::now().timestamp() {
            return Err(TokenError::RefreshWindowElapsed);
        }
        Ok(claims)
    }
}
