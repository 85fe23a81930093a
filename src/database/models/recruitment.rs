use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgConnection};

use crate::auth::Owned;
use crate::database::patch::{merge, Patch};
use crate::database::repository::{Create, Resource};

#[derive(Debug, Clone, FromRow)]
pub struct Recruitment {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub deadline: DateTime<Utc>,
    pub max_count: i32,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Why a user cannot sign up for a recruitment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRefusal {
    Closed,
    Full,
}

impl Recruitment {
    pub fn check_joinable(&self, participants: i64, now: DateTime<Utc>) -> Result<(), JoinRefusal> {
        if now > self.deadline {
            return Err(JoinRefusal::Closed);
        }
        if participants >= i64::from(self.max_count) {
            return Err(JoinRefusal::Full);
        }
        Ok(())
    }
}

impl Owned for Recruitment {
    const LABEL: &'static str = "recruitment";

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

#[async_trait]
impl Resource for Recruitment {
    const TABLE: &'static str = "recruitments";

    fn id(&self) -> i64 {
        self.id
    }

    async fn persist(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE recruitments SET title = $2, content = $3, deadline = $4, max_count = $5 WHERE id = $1")
            .bind(self.id)
            .bind(&self.title)
            .bind(&self.content)
            .bind(self.deadline)
            .bind(self.max_count)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRecruitment {
    pub title: String,
    pub content: String,
    pub deadline: DateTime<Utc>,
    pub max_count: i32,
}

#[async_trait]
impl Create<Recruitment> for NewRecruitment {
    async fn insert(self, conn: &mut PgConnection, owner_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO recruitments (title, content, deadline, max_count, user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(self.title)
        .bind(self.content)
        .bind(self.deadline)
        .bind(self.max_count)
        .bind(owner_id)
        .fetch_one(&mut *conn)
        .await
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RecruitmentPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub max_count: Option<i32>,
}

impl Patch<Recruitment> for RecruitmentPatch {
    fn apply(self, target: &mut Recruitment) {
        merge(&mut target.title, self.title);
        merge(&mut target.content, self.content);
        merge(&mut target.deadline, self.deadline);
        merge(&mut target.max_count, self.max_count);
    }
}
