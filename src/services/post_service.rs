use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::{require_text, require_text_if_present, ServiceError};
use crate::auth::{Principal, Relation};
use crate::config::PaginationConfig;
use crate::database::models::{NewPost, NoticeToggle, Post, PostPatch};
use crate::database::{contains_pattern, page_count, Page, PageQuery, Repository};

/// Row of the board listing
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub views: i32,
    pub is_notice: bool,
    pub user_id: i64,
    pub creator_nickname: String,
    pub comment_count: i64,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Full post as seen by one viewer
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PostDetail {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub views: i32,
    pub is_notice: bool,
    pub user_id: i64,
    pub creator_nickname: String,
    pub creator_image: Option<String>,
    pub like_count: i64,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Liker {
    pub user_id: i64,
    pub nickname: String,
    pub image_file_name: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct LikeStatus {
    pub liked: bool,
    pub like_count: i64,
}

const SUMMARY_COLUMNS: &str = "p.id, p.title, p.views, p.is_notice, p.user_id, u.nickname AS creator_nickname, \
     (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comment_count, \
     (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id) AS like_count, \
     p.created_at";

#[derive(Clone)]
pub struct PostService {
    pool: PgPool,
    posts: Repository<Post>,
    page_size: u32,
    home_size: u32,
}

impl PostService {
    pub fn new(pool: PgPool, pagination: &PaginationConfig) -> Self {
        Self {
            posts: Repository::new(pool.clone()),
            pool,
            page_size: pagination.page_size,
            home_size: pagination.home_size,
        }
    }

    /// Notices first, then newest first. The keyword matches titles case-insensitively.
    pub async fn list(&self, query: &PageQuery) -> Result<Vec<PostSummary>, ServiceError> {
        let page = Page::new(query.page, self.page_size);
        let sql = format!(
            "SELECT {} FROM posts p JOIN users u ON u.id = p.user_id \
             WHERE p.title ILIKE $1 \
             ORDER BY p.is_notice DESC, p.id DESC LIMIT $2 OFFSET $3",
            SUMMARY_COLUMNS
        );
        let rows = sqlx::query_as::<_, PostSummary>(&sql)
            .bind(contains_pattern(query.keyword.as_deref()))
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn page_count(&self, keyword: Option<&str>) -> Result<i64, ServiceError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE title ILIKE $1")
            .bind(contains_pattern(keyword))
            .fetch_one(&self.pool)
            .await?;
        Ok(page_count(total, self.page_size))
    }

    /// Landing page excerpt, same ordering as the board.
    pub async fn home(&self) -> Result<Vec<PostSummary>, ServiceError> {
        let sql = format!(
            "SELECT {} FROM posts p JOIN users u ON u.id = p.user_id \
             ORDER BY p.is_notice DESC, p.id DESC LIMIT $1",
            SUMMARY_COLUMNS
        );
        let rows = sqlx::query_as::<_, PostSummary>(&sql)
            .bind(i64::from(self.home_size))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(&self, input: NewPost, principal: &Principal) -> Result<i64, ServiceError> {
        require_text("title", &input.title)?;
        require_text("content", &input.content)?;
        self.posts.create(input, principal).await
    }

    /// Count one view and return the post as `viewer` sees it.
    pub async fn get(&self, id: i64, viewer: &Principal) -> Result<PostDetail, ServiceError> {
        let mut tx = self.pool.begin().await?;
        Repository::<Post>::increment(&mut *tx, id, "views").await?;

        let detail = sqlx::query_as::<_, PostDetail>(
            "SELECT p.id, p.title, p.content, p.views, p.is_notice, p.user_id, \
                    u.nickname AS creator_nickname, u.image_file_name AS creator_image, \
                    (SELECT COUNT(*) FROM post_likes l WHERE l.post_id = p.id) AS like_count, \
                    EXISTS (SELECT 1 FROM post_likes l WHERE l.post_id = p.id AND l.user_id = $2) AS is_liked, \
                    p.created_at \
             FROM posts p JOIN users u ON u.id = p.user_id WHERE p.id = $1",
        )
        .bind(id)
        .bind(viewer.user_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(detail)
    }

    pub async fn update(&self, id: i64, patch: PostPatch, principal: &Principal) -> Result<i64, ServiceError> {
        require_text_if_present("title", patch.title.as_deref())?;
        require_text_if_present("content", patch.content.as_deref())?;
        self.posts.update(id, patch, principal, Relation::Owner).await
    }

    pub async fn delete(&self, id: i64, principal: &Principal) -> Result<(), ServiceError> {
        self.posts.delete(id, principal, Relation::Owner).await
    }

    /// Flip the viewer's like. The post row lock serializes concurrent toggles.
    pub async fn toggle_like(&self, post_id: i64, principal: &Principal) -> Result<LikeStatus, ServiceError> {
        let mut tx = self.pool.begin().await?;
        Repository::<Post>::lock(&mut *tx, post_id).await?;

        let removed = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(principal.user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if removed == 0 {
            sqlx::query("INSERT INTO post_likes (post_id, user_id) VALUES ($1, $2)")
                .bind(post_id)
                .bind(principal.user_id)
                .execute(&mut *tx)
                .await?;
        }

        let like_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM post_likes WHERE post_id = $1")
            .bind(post_id)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        let liked = removed == 0;
        tracing::debug!("user {} {} post {}", principal.user_id, if liked { "liked" } else { "unliked" }, post_id);
        Ok(LikeStatus { liked, like_count })
    }

    pub async fn likers(&self, post_id: i64) -> Result<Vec<Liker>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        Repository::<Post>::ensure_exists(&mut *conn, post_id).await?;

        let rows = sqlx::query_as::<_, Liker>(
            "SELECT u.id AS user_id, u.nickname, u.image_file_name \
             FROM post_likes l JOIN users u ON u.id = l.user_id \
             WHERE l.post_id = $1 ORDER BY l.id",
        )
        .bind(post_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Pin or unpin a post on the board. Administrators only.
    pub async fn toggle_notice(&self, id: i64, principal: &Principal) -> Result<bool, ServiceError> {
        let post = self.posts.update_returning(id, NoticeToggle, principal, Relation::Admin).await?;
        tracing::info!("user {} set notice={} on post {}", principal.user_id, post.is_notice, id);
        Ok(post.is_notice)
    }
}
