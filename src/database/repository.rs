use async_trait::async_trait;
use sqlx::{postgres::PgRow, FromRow, PgConnection, PgPool};

use crate::auth::{authorize, Owned, Principal, Relation};
use crate::database::patch::Patch;
use crate::services::ServiceError;

/// A stored entity governed by the ownership CRUD workflow.
///
/// Implementors supply the per-entity configuration: table, owner and the
/// statement that writes a merged row back. Lookup, locking, authorization and
/// deletion are shared by [`Repository`].
#[async_trait]
pub trait Resource: Owned + for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + Sized {
    const TABLE: &'static str;

    fn id(&self) -> i64;

    /// Write every user-settable column of `self` back to its row.
    async fn persist(&self, conn: &mut PgConnection) -> Result<(), sqlx::Error>;
}

/// Input that creates a new `R` attributed to an owner.
#[async_trait]
pub trait Create<R: Resource>: Send {
    async fn insert(self, conn: &mut PgConnection, owner_id: i64) -> Result<i64, sqlx::Error>;
}

/// Generic fetch-check-mutate workflow over one resource type
pub struct Repository<R> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<R>,
}

impl<R> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<R: Resource> Repository<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn create<I: Create<R>>(&self, input: I, principal: &Principal) -> Result<i64, ServiceError> {
        let mut tx = self.pool.begin().await?;
        let id = Self::insert(&mut *tx, input, principal).await?;
        tx.commit().await?;
        Ok(id)
    }

    /// Insert inside a caller's transaction, e.g. after locking a parent row.
    pub async fn insert<I: Create<R>>(conn: &mut PgConnection, input: I, principal: &Principal) -> Result<i64, ServiceError> {
        let id = input.insert(conn, principal.user_id).await?;
        tracing::info!("user {} created {} {}", principal.user_id, R::LABEL, id);
        Ok(id)
    }

    pub async fn find(&self, id: i64) -> Result<R, ServiceError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1", R::TABLE);
        sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::not_found(R::LABEL, id))
    }

    /// Fail with NotFound unless a row with `id` exists.
    pub async fn ensure_exists(conn: &mut PgConnection, id: i64) -> Result<(), ServiceError> {
        let sql = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", R::TABLE);
        let exists: bool = sqlx::query_scalar(&sql).bind(id).fetch_one(&mut *conn).await?;
        if exists {
            Ok(())
        } else {
            Err(ServiceError::not_found(R::LABEL, id))
        }
    }

    /// Fetch and row-lock `id` for the rest of the transaction.
    pub async fn lock(conn: &mut PgConnection, id: i64) -> Result<R, ServiceError> {
        let sql = format!("SELECT * FROM {} WHERE id = $1 FOR UPDATE", R::TABLE);
        sqlx::query_as::<_, R>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| ServiceError::not_found(R::LABEL, id))
    }

    pub async fn update<P>(&self, id: i64, patch: P, principal: &Principal, relation: Relation) -> Result<i64, ServiceError>
    where
        P: Patch<R> + Send,
    {
        let row = self.update_returning(id, patch, principal, relation).await?;
        Ok(row.id())
    }

    /// Same as [`Repository::update`], handing back the row as merged under the lock.
    pub async fn update_returning<P>(&self, id: i64, patch: P, principal: &Principal, relation: Relation) -> Result<R, ServiceError>
    where
        P: Patch<R> + Send,
    {
        let mut tx = self.pool.begin().await?;
        let mut row = Self::lock(&mut *tx, id).await?;
        authorize(&row, principal, relation)?;

        patch.apply(&mut row);
        row.persist(&mut *tx).await?;
        tx.commit().await?;

        tracing::debug!("user {} updated {} {}", principal.user_id, R::LABEL, id);
        Ok(row)
    }

    /// Delete after the ownership check. Dependent rows go with it through FK cascades.
    pub async fn delete(&self, id: i64, principal: &Principal, relation: Relation) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;
        let row = Self::lock(&mut *tx, id).await?;
        authorize(&row, principal, relation)?;

        let sql = format!("DELETE FROM {} WHERE id = $1", R::TABLE);
        sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!("user {} deleted {} {}", principal.user_id, R::LABEL, id);
        Ok(())
    }

    /// Atomically bump a counter column and fail NotFound if the row is gone.
    pub async fn increment(conn: &mut PgConnection, id: i64, column: &'static str) -> Result<(), ServiceError> {
        let sql = format!("UPDATE {} SET {col} = {col} + 1 WHERE id = $1", R::TABLE, col = column);
        let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::not_found(R::LABEL, id));
        }
        Ok(())
    }
}
