use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgConnection, PgPool};

use super::{require_text, require_text_if_present, ServiceError};
use crate::auth::{Principal, Relation};
use crate::database::models::{JoinRefusal, NewRecruitment, Recruitment, RecruitmentPatch};
use crate::database::{DatabaseError, Repository};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct RecruitmentSummary {
    pub id: i64,
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub max_count: i32,
    pub participant_count: i64,
    pub user_id: i64,
    pub creator_nickname: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ParticipantView {
    pub user_id: i64,
    pub nickname: String,
    pub image_file_name: Option<String>,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecruitmentDetail {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub deadline: DateTime<Utc>,
    pub max_count: i32,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub participants: Vec<ParticipantView>,
}

impl From<JoinRefusal> for ServiceError {
    fn from(refusal: JoinRefusal) -> Self {
        match refusal {
            JoinRefusal::Closed => ServiceError::Conflict("Recruitment deadline has passed".to_string()),
            JoinRefusal::Full => ServiceError::Conflict("Recruitment is full".to_string()),
        }
    }
}

#[derive(Clone)]
pub struct RecruitmentService {
    pool: PgPool,
    recruitments: Repository<Recruitment>,
}

impl RecruitmentService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            recruitments: Repository::new(pool.clone()),
            pool,
        }
    }

    pub async fn list(&self) -> Result<Vec<RecruitmentSummary>, ServiceError> {
        let rows = sqlx::query_as::<_, RecruitmentSummary>(
            "SELECT r.id, r.title, r.deadline, r.max_count, \
                    (SELECT COUNT(*) FROM participants p WHERE p.recruitment_id = r.id) AS participant_count, \
                    r.user_id, u.nickname AS creator_nickname, r.created_at \
             FROM recruitments r JOIN users u ON u.id = r.user_id ORDER BY r.id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, input: NewRecruitment, principal: &Principal) -> Result<i64, ServiceError> {
        require_text("title", &input.title)?;
        validate_max_count(input.max_count)?;
        self.recruitments.create(input, principal).await
    }

    pub async fn get(&self, id: i64) -> Result<RecruitmentDetail, ServiceError> {
        let recruitment = self.recruitments.find(id).await?;
        let mut conn = self.pool.acquire().await?;
        let participants = participants_of(&mut *conn, id).await?;

        Ok(RecruitmentDetail {
            id: recruitment.id,
            title: recruitment.title,
            content: recruitment.content,
            deadline: recruitment.deadline,
            max_count: recruitment.max_count,
            user_id: recruitment.user_id,
            created_at: recruitment.created_at,
            participants,
        })
    }

    pub async fn update(&self, id: i64, patch: RecruitmentPatch, principal: &Principal) -> Result<i64, ServiceError> {
        require_text_if_present("title", patch.title.as_deref())?;
        if let Some(max_count) = patch.max_count {
            validate_max_count(max_count)?;
        }
        self.recruitments.update(id, patch, principal, Relation::Owner).await
    }

    pub async fn delete(&self, id: i64, principal: &Principal) -> Result<(), ServiceError> {
        self.recruitments.delete(id, principal, Relation::Owner).await
    }

    /// Sign the principal up. The recruitment row lock keeps the head count exact.
    pub async fn join(&self, id: i64, principal: &Principal) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;
        let recruitment = Repository::<Recruitment>::lock(&mut *tx, id).await?;

        let joined: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM participants WHERE recruitment_id = $1 AND user_id = $2)",
        )
        .bind(id)
        .bind(principal.user_id)
        .fetch_one(&mut *tx)
        .await?;
        if joined {
            return Err(already_joined());
        }

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM participants WHERE recruitment_id = $1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        recruitment.check_joinable(count, Utc::now())?;

        let inserted = sqlx::query("INSERT INTO participants (recruitment_id, user_id) VALUES ($1, $2)")
            .bind(id)
            .bind(principal.user_id)
            .execute(&mut *tx)
            .await;
        if let Err(e) = inserted {
            let err = DatabaseError::from(e);
            return Err(if err.is_unique_violation() { already_joined() } else { err.into() });
        }
        tx.commit().await?;

        tracing::info!("user {} joined recruitment {}", principal.user_id, id);
        Ok(())
    }

    pub async fn leave(&self, id: i64, principal: &Principal) -> Result<(), ServiceError> {
        let result = sqlx::query("DELETE FROM participants WHERE recruitment_id = $1 AND user_id = $2")
            .bind(id)
            .bind(principal.user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(format!(
                "user {} has not joined recruitment {}",
                principal.user_id, id
            )));
        }

        tracing::info!("user {} left recruitment {}", principal.user_id, id);
        Ok(())
    }

    pub async fn participants(&self, id: i64) -> Result<Vec<ParticipantView>, ServiceError> {
        let mut conn = self.pool.acquire().await?;
        Repository::<Recruitment>::ensure_exists(&mut *conn, id).await?;
        participants_of(&mut *conn, id).await
    }
}

async fn participants_of(conn: &mut PgConnection, recruitment_id: i64) -> Result<Vec<ParticipantView>, ServiceError> {
    let rows = sqlx::query_as::<_, ParticipantView>(
        "SELECT u.id AS user_id, u.nickname, u.image_file_name, p.created_at AS joined_at \
         FROM participants p JOIN users u ON u.id = p.user_id \
         WHERE p.recruitment_id = $1 ORDER BY p.id",
    )
    .bind(recruitment_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

fn validate_max_count(max_count: i32) -> Result<(), ServiceError> {
    if max_count < 1 {
        return Err(ServiceError::Invalid("max_count must be at least 1".to_string()));
    }
    Ok(())
}

fn already_joined() -> ServiceError {
    ServiceError::Conflict("Already joined this recruitment".to_string())
}
