use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use super::{require_text, require_text_if_present, ServiceError};
use crate::auth::{Principal, Relation};
use crate::database::models::{HotPlace, HotPlacePatch, NewHotPlace};
use crate::database::Repository;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HotPlaceSummary {
    pub id: i64,
    pub name: String,
    pub place_type: i32,
    pub address: String,
    pub image_file_name: Option<String>,
    pub views: i32,
    pub user_id: i64,
    pub creator_nickname: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HotPlaceDetail {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub place_type: i32,
    pub address: String,
    pub visit_date: NaiveDate,
    pub image_file_name: Option<String>,
    pub views: i32,
    pub user_id: i64,
    pub creator_nickname: String,
    pub creator_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct HotPlaceService {
    pool: PgPool,
    places: Repository<HotPlace>,
}

impl HotPlaceService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            places: Repository::new(pool.clone()),
            pool,
        }
    }

    pub async fn list(&self) -> Result<Vec<HotPlaceSummary>, ServiceError> {
        let rows = sqlx::query_as::<_, HotPlaceSummary>(
            "SELECT h.id, h.name, h.place_type, h.address, h.image_file_name, h.views, h.user_id, \
                    u.nickname AS creator_nickname, h.created_at \
             FROM hot_places h JOIN users u ON u.id = h.user_id ORDER BY h.id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, input: NewHotPlace, principal: &Principal) -> Result<i64, ServiceError> {
        require_text("name", &input.name)?;
        require_text("address", &input.address)?;
        self.places.create(input, principal).await
    }

    pub async fn get(&self, id: i64) -> Result<HotPlaceDetail, ServiceError> {
        let mut tx = self.pool.begin().await?;
        Repository::<HotPlace>::increment(&mut *tx, id, "views").await?;

        let detail = sqlx::query_as::<_, HotPlaceDetail>(
            "SELECT h.id, h.name, h.content, h.place_type, h.address, h.visit_date, h.image_file_name, \
                    h.views, h.user_id, u.nickname AS creator_nickname, u.image_file_name AS creator_image, \
                    h.created_at \
             FROM hot_places h JOIN users u ON u.id = h.user_id WHERE h.id = $1",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(detail)
    }

    pub async fn update(&self, id: i64, patch: HotPlacePatch, principal: &Principal) -> Result<i64, ServiceError> {
        require_text_if_present("name", patch.name.as_deref())?;
        require_text_if_present("address", patch.address.as_deref())?;
        self.places.update(id, patch, principal, Relation::Owner).await
    }

    pub async fn delete(&self, id: i64, principal: &Principal) -> Result<(), ServiceError> {
        self.places.delete(id, principal, Relation::Owner).await
    }
}
