use serde::Deserialize;
use sqlx::PgPool;

use super::ServiceError;
use crate::database::models::AttractionInfo;

/// Region and category filter for the attraction search
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TourQuery {
    pub sido_code: i32,
    pub gugun_code: i32,
    pub content_type_id: i32,
}

#[derive(Clone)]
pub struct TourService {
    pool: PgPool,
}

impl TourService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn search(&self, query: TourQuery) -> Result<Vec<AttractionInfo>, ServiceError> {
        let rows = sqlx::query_as::<_, AttractionInfo>(
            "SELECT * FROM attraction_info \
             WHERE sido_code = $1 AND gugun_code = $2 AND content_type_id = $3 \
             ORDER BY content_id",
        )
        .bind(query.sido_code)
        .bind(query.gugun_code)
        .bind(query.content_type_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get(&self, content_id: i32) -> Result<AttractionInfo, ServiceError> {
        sqlx::query_as::<_, AttractionInfo>("SELECT * FROM attraction_info WHERE content_id = $1")
            .bind(content_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("attraction", content_id))
    }
}
