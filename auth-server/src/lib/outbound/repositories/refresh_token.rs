use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::auth::errors::TokenStoreError;
use crate::domain::auth::models::RefreshTokenRecord;
use crate::domain::auth::ports::RefreshTokenRepository;

pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> TokenStoreError {
    TokenStoreError::DatabaseError(e.to_string())
}

const INSERT_RECORD: &str = r#"
    INSERT INTO refresh_tokens (jti, user_id, expires_at, created_at)
    VALUES ($1, $2, $3, $4)
"#;

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn store(&self, record: RefreshTokenRecord) -> Result<(), TokenStoreError> {
        sqlx::query(INSERT_RECORD)
            .bind(record.jti)
            .bind(record.user_id.0)
            .bind(record.expires_at)
            .bind(record.created_at)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(())
    }

    async fn rotate(
        &self,
        jti: &Uuid,
        replacement: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<bool, TokenStoreError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        // The row lock taken by DELETE makes a concurrent rotation of the same
        // jti wait, then find nothing to delete
        let spent = sqlx::query(
            r#"
            DELETE FROM refresh_tokens
            WHERE jti = $1 AND expires_at > $2
            "#,
        )
        .bind(jti)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(database_error)?;

        if spent.rows_affected() != 1 {
            tx.rollback().await.map_err(database_error)?;
            return Ok(false);
        }

        sqlx::query(INSERT_RECORD)
            .bind(replacement.jti)
            .bind(replacement.user_id.0)
            .bind(replacement.expires_at)
            .bind(replacement.created_at)
            .execute(&mut *tx)
            .await
            .map_err(database_error)?;

        tx.commit().await.map_err(database_error)?;
        Ok(true)
    }

    async fn revoke(&self, jti: &Uuid) -> Result<(), TokenStoreError> {
        sqlx::query("DELETE FROM refresh_tokens WHERE jti = $1")
            .bind(jti)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenStoreError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}
