use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};

use super::{require_text, require_text_if_present, ServiceError};
use crate::auth::{authorize, hash_password, verify_password, Principal, Relation, Role, Token, TokenService};
use crate::config::AdminBootstrap;
use crate::database::models::{NewUser, PasswordReset, User, UserPatch};
use crate::database::{DatabaseError, Patch, Repository, Resource};

#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordCheck {
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
}

/// Public view of an account; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub nickname: String,
    pub role: String,
    pub image_file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            nickname: user.nickname,
            role: user.role,
            image_file_name: user.image_file_name,
            created_at: user.created_at,
        }
    }
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
    users: Repository<User>,
    tokens: TokenService,
}

impl UserService {
    pub fn new(pool: PgPool, tokens: TokenService) -> Self {
        Self {
            users: Repository::new(pool.clone()),
            pool,
            tokens,
        }
    }

    pub async fn signup(&self, request: SignupRequest) -> Result<i64, ServiceError> {
        let email = request.email.trim().to_string();
        if !email.contains('@') {
            return Err(ServiceError::Invalid("email is not a valid address".to_string()));
        }
        require_text("nickname", &request.nickname)?;

        let new_user = NewUser {
            email,
            password_hash: hash_password(&request.password)?,
            nickname: request.nickname.trim().to_string(),
            role: Role::User,
        };
        self.insert_unique(new_user).await
    }

    /// Insert unless the email is taken. The unique index catches a racing duplicate.
    async fn insert_unique(&self, new_user: NewUser) -> Result<i64, ServiceError> {
        let mut tx = self.pool.begin().await?;
        if self.find_by_email(&mut *tx, &new_user.email).await?.is_some() {
            return Err(duplicate_email());
        }

        let id = match new_user.insert(&mut *tx).await {
            Ok(id) => id,
            Err(e) => {
                let err = DatabaseError::from(e);
                return Err(if err.is_unique_violation() { duplicate_email() } else { err.into() });
            }
        };
        tx.commit().await?;

        tracing::info!("registered user {} ({})", id, new_user.email);
        Ok(id)
    }

    async fn find_by_email(&self, conn: &mut PgConnection, email: &str) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<Token, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        let user = self
            .find_by_email(&mut *conn, request.email.trim())
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        verify_password(&request.password, &user.password).map_err(|e| {
            tracing::warn!("failed login for user {}", user.id);
            ServiceError::from(e)
        })?;

        Ok(self.tokens.issue(user.id, &user.email, user.role())?)
    }

    /// Exchange a recently expired token for a fresh one. The account must still exist.
    pub async fn refresh(&self, token: &str) -> Result<Token, ServiceError> {
        let claims = self.tokens.verify_for_refresh(token)?;
        let user = self
            .users
            .find(claims.user_id()?)
            .await
            .map_err(|e| match e {
                ServiceError::NotFound(_) => ServiceError::Unauthenticated("Account no longer exists".to_string()),
                other => other,
            })?;

        Ok(self.tokens.issue(user.id, &user.email, user.role())?)
    }

    pub async fn profile(&self, id: i64) -> Result<UserProfile, ServiceError> {
        Ok(self.users.find(id).await?.into())
    }

    pub async fn update(&self, id: i64, patch: UserPatch, principal: &Principal) -> Result<i64, ServiceError> {
        require_text_if_present("nickname", patch.nickname.as_deref())?;
        self.users.update(id, patch, principal, Relation::Owner).await
    }

    pub async fn delete(&self, id: i64, principal: &Principal) -> Result<(), ServiceError> {
        self.users.delete(id, principal, Relation::Owner).await
    }

    pub async fn check_password(&self, principal: &Principal, request: PasswordCheck) -> Result<(), ServiceError> {
        let user = self.users.find(principal.user_id).await?;
        verify_password(&request.password, &user.password)?;
        Ok(())
    }

    pub async fn change_password(&self, id: i64, request: PasswordChange, principal: &Principal) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;
        let mut user = Repository::<User>::lock(&mut *tx, id).await?;
        authorize(&user, principal, Relation::Owner)?;
        verify_password(&request.old_password, &user.password)?;

        let new_hash = hash_password(&request.new_password)?;
        PasswordReset(new_hash).apply(&mut user);
        user.persist(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!("user {} changed password", id);
        Ok(())
    }

    /// Ensure the configured administrator exists and holds the admin role.
    /// An existing account keeps its password and is only promoted.
    pub async fn bootstrap_admin(&self, admin: &AdminBootstrap) -> Result<i64, ServiceError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (email, password, nickname, role) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role RETURNING id",
        )
        .bind(&admin.email)
        .bind(hash_password(&admin.password)?)
        .bind(&admin.nickname)
        .bind(Role::Admin.as_str())
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("administrator {} ready (user {})", admin.email, id);
        Ok(id)
    }

    pub async fn grant_admin(&self, email: &str) -> Result<(), ServiceError> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE email = $1")
            .bind(email)
            .bind(Role::Admin.as_str())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!("No user with email {}", email)));
        }
        tracing::info!("granted administrator role to {}", email);
        Ok(())
    }
}

fn duplicate_email() -> ServiceError {
    ServiceError::DuplicateResource("Email is already registered".to_string())
}
