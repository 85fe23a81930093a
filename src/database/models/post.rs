use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgConnection};

use crate::auth::Owned;
use crate::database::patch::{merge, Patch};
use crate::database::repository::{Create, Resource};

#[derive(Debug, Clone, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub views: i32,
    pub is_notice: bool,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Owned for Post {
    const LABEL: &'static str = "post";

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

#[async_trait]
impl Resource for Post {
    const TABLE: &'static str = "posts";

    fn id(&self) -> i64 {
        self.id
    }

    async fn persist(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE posts SET title = $2, content = $3, is_notice = $4 WHERE id = $1")
            .bind(self.id)
            .bind(&self.title)
            .bind(&self.content)
            .bind(self.is_notice)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

#[async_trait]
impl Create<Post> for NewPost {
    async fn insert(self, conn: &mut PgConnection, owner_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("INSERT INTO posts (title, content, user_id) VALUES ($1, $2, $3) RETURNING id")
            .bind(self.title)
            .bind(self.content)
            .bind(owner_id)
            .fetch_one(&mut *conn)
            .await
    }
}

/// Author edits; the notice flag is only changed through [`NoticeToggle`].
#[derive(Debug, Default, Deserialize)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl Patch<Post> for PostPatch {
    fn apply(self, target: &mut Post) {
        merge(&mut target.title, self.title);
        merge(&mut target.content, self.content);
    }
}

pub struct NoticeToggle;

impl Patch<Post> for NoticeToggle {
    fn apply(self, target: &mut Post) {
        target.is_notice = !target.is_notice;
    }
}
