use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgConnection};

use crate::auth::{Owned, Role};
use crate::database::patch::{merge, nullable, Patch};
use crate::database::repository::Resource;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    /// Argon2 PHC string
    pub password: String,
    pub nickname: String,
    pub role: String,
    pub image_file_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Unknown stored roles degrade to an ordinary user.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::User)
    }
}

impl Owned for User {
    const LABEL: &'static str = "user";

    fn owner_id(&self) -> i64 {
        self.id
    }
}

#[async_trait]
impl Resource for User {
    const TABLE: &'static str = "users";

    fn id(&self) -> i64 {
        self.id
    }

    async fn persist(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password = $2, nickname = $3, role = $4, image_file_name = $5 WHERE id = $1")
            .bind(self.id)
            .bind(&self.password)
            .bind(&self.nickname)
            .bind(&self.role)
            .bind(&self.image_file_name)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

/// Account row ready for insertion; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub nickname: String,
    pub role: Role,
}

impl NewUser {
    pub async fn insert(&self, conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("INSERT INTO users (email, password, nickname, role) VALUES ($1, $2, $3, $4) RETURNING id")
            .bind(&self.email)
            .bind(&self.password_hash)
            .bind(&self.nickname)
            .bind(self.role.as_str())
            .fetch_one(&mut *conn)
            .await
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserPatch {
    pub nickname: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_file_name: Option<Option<String>>,
}

impl Patch<User> for UserPatch {
    fn apply(self, target: &mut User) {
        merge(&mut target.nickname, self.nickname);
        merge(&mut target.image_file_name, self.image_file_name);
    }
}

/// Replaces the stored password hash.
pub struct PasswordReset(pub String);

impl Patch<User> for PasswordReset {
    fn apply(self, target: &mut User) {
        target.password = self.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: 3,
            email: "hiker@example.com".to_string(),
            password: "$argon2id$stub".to_string(),
            nickname: "hiker".to_string(),
            role: "ROLE_USER".to_string(),
            image_file_name: Some("me.png".to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn user_owns_itself() {
        assert_eq!(user().owner_id(), 3);
    }

    #[test]
    fn unknown_role_is_ordinary_user() {
        let mut u = user();
        u.role = "ROLE_SUPERUSER".to_string();
        assert_eq!(u.role(), Role::User);
        u.role = "ROLE_ADMIN".to_string();
        assert_eq!(u.role(), Role::Admin);
    }

    #[test]
    fn patch_leaves_email_and_password_alone() {
        let mut u = user();
        let patch: UserPatch = serde_json::from_str(r#"{"nickname": "trekker", "image_file_name": null}"#).unwrap();
        patch.apply(&mut u);
        assert_eq!(u.nickname, "trekker");
        assert_eq!(u.image_file_name, None);
        assert_eq!(u.email, "hiker@example.com");
        assert_eq!(u.password, "$argon2id$stub");
    }
}
