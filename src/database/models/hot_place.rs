use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{FromRow, PgConnection};

use crate::auth::Owned;
use crate::database::patch::{merge, nullable, Patch};
use crate::database::repository::{Create, Resource};

#[derive(Debug, Clone, FromRow)]
pub struct HotPlace {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub place_type: i32,
    pub address: String,
    pub visit_date: NaiveDate,
    pub image_file_name: Option<String>,
    pub views: i32,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Owned for HotPlace {
    const LABEL: &'static str = "hot place";

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

#[async_trait]
impl Resource for HotPlace {
    const TABLE: &'static str = "hot_places";

    fn id(&self) -> i64 {
        self.id
    }

    async fn persist(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE hot_places SET name = $2, content = $3, place_type = $4, address = $5, \
             visit_date = $6, image_file_name = $7 WHERE id = $1",
        )
        .bind(self.id)
        .bind(&self.name)
        .bind(&self.content)
        .bind(self.place_type)
        .bind(&self.address)
        .bind(self.visit_date)
        .bind(&self.image_file_name)
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewHotPlace {
    pub name: String,
    pub content: String,
    pub place_type: i32,
    pub address: String,
    pub visit_date: NaiveDate,
    #[serde(default)]
    pub image_file_name: Option<String>,
}

#[async_trait]
impl Create<HotPlace> for NewHotPlace {
    async fn insert(self, conn: &mut PgConnection, owner_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO hot_places (name, content, place_type, address, visit_date, image_file_name, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(self.name)
        .bind(self.content)
        .bind(self.place_type)
        .bind(self.address)
        .bind(self.visit_date)
        .bind(self.image_file_name)
        .bind(owner_id)
        .fetch_one(&mut *conn)
        .await
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct HotPlacePatch {
    pub name: Option<String>,
    pub content: Option<String>,
    pub place_type: Option<i32>,
    pub address: Option<String>,
    pub visit_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_file_name: Option<Option<String>>,
}

impl Patch<HotPlace> for HotPlacePatch {
    fn apply(self, target: &mut HotPlace) {
        merge(&mut target.name, self.name);
        merge(&mut target.content, self.content);
        merge(&mut target.place_type, self.place_type);
        merge(&mut target.address, self.address);
        merge(&mut target.visit_date, self.visit_date);
        merge(&mut target.image_file_name, self.image_file_name);
    }
}
