use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgConnection};

use crate::auth::Owned;
use crate::database::patch::{merge, Patch};
use crate::database::repository::{Create, Resource};

#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Owned for Comment {
    const LABEL: &'static str = "comment";

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

#[async_trait]
impl Resource for Comment {
    const TABLE: &'static str = "comments";

    fn id(&self) -> i64 {
        self.id
    }

    async fn persist(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE comments SET content = $2 WHERE id = $1")
            .bind(self.id)
            .bind(&self.content)
            .execute(&mut *conn)
            .await?;
        Ok(())
    }
}

/// Request body for writing or editing a comment
#[derive(Debug, Clone, Deserialize)]
pub struct CommentBody {
    pub content: String,
}

/// A comment bound to the post it is written on
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: i64,
    pub content: String,
}

#[async_trait]
impl Create<Comment> for NewComment {
    async fn insert(self, conn: &mut PgConnection, owner_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("INSERT INTO comments (post_id, user_id, content) VALUES ($1, $2, $3) RETURNING id")
            .bind(self.post_id)
            .bind(owner_id)
            .bind(self.content)
            .fetch_one(&mut *conn)
            .await
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentPatch {
    pub content: Option<String>,
}

impl Patch<Comment> for CommentPatch {
    fn apply(self, target: &mut Comment) {
        merge(&mut target.content, self.content);
    }
}
