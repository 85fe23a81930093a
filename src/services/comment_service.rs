use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::{require_text, ServiceError};
use crate::auth::{Principal, Relation};
use crate::database::models::{Comment, CommentBody, CommentPatch, NewComment, Post};
use crate::database::Repository;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CommentView {
    pub id: i64,
    pub content: String,
    pub creator_id: i64,
    pub creator_nickname: String,
    pub creator_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct CommentService {
    pool: PgPool,
    comments: Repository<Comment>,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            comments: Repository::new(pool.clone()),
            pool,
        }
    }

    /// Oldest first. Fails NotFound when the post is gone.
    pub async fn list(&self, post_id: i64) -> Result<Vec<CommentView>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        Repository::<Post>::ensure_exists(&mut *conn, post_id).await?;

        let rows = sqlx::query_as::<_, CommentView>(
            "SELECT c.id, c.content, c.user_id AS creator_id, u.nickname AS creator_nickname, \
                    u.image_file_name AS creator_image, c.created_at \
             FROM comments c JOIN users u ON u.id = c.user_id \
             WHERE c.post_id = $1 ORDER BY c.id",
        )
        .bind(post_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, post_id: i64, body: CommentBody, principal: &Principal) -> Result<i64, ServiceError> {
        require_text("content", &body.content)?;

        // The post must survive until the comment is in.
        let mut tx = self.pool.begin().await?;
        Repository::<Post>::lock(&mut *tx, post_id).await?;
        let input = NewComment { post_id, content: body.content };
        let id = Repository::<Comment>::insert(&mut *tx, input, principal).await?;
        tx.commit().await?;
        Ok(id)
    }

    pub async fn update(&self, id: i64, body: CommentBody, principal: &Principal) -> Result<i64, ServiceError> {
        require_text("content", &body.content)?;
        let patch = CommentPatch { content: Some(body.content) };
        self.comments.update(id, patch, principal, Relation::Owner).await
    }

    pub async fn delete(&self, id: i64, principal: &Principal) -> Result<(), ServiceError> {
        self.comments.delete(id, principal, Relation::Owner).await
    }
}
