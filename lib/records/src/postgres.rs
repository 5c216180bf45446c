//! PostgreSQL record store.

use crate::api_key::ApiKey;
use crate::error::StoreError;
use crate::presentation::PresentationRecord;
use crate::store::RecordStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nexus_core::{ApiKeyId, PresentationId, UserId};
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use std::str::FromStr;
use tracing::info;

const MAX_CONNECTIONS: u32 = 5;

/// Record store backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Connects to `database_url` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails.
    pub async fn connect(database_url: &str) -> nexus_core::Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::ConnectionFailed {
                reason: e.to_string(),
            })?;

        info!("running database migrations");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::MigrationFailed {
                reason: e.to_string(),
            })?;

        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool; migrations are the caller's concern.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_error(what: &str, value: &str, e: impl std::fmt::Display) -> sqlx::Error {
    sqlx::Error::Decode(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        format!("invalid {what} '{value}': {e}"),
    )))
}

/// Row type for API key queries.
#[derive(FromRow)]
struct ApiKeyRow {
    id: String,
    key: String,
    name: String,
    user_id: String,
    created_at: DateTime<Utc>,
    active: bool,
}

impl ApiKeyRow {
    fn try_into_api_key(self) -> Result<ApiKey, sqlx::Error> {
        let id = ApiKeyId::from_str(&self.id).map_err(|e| decode_error("api key id", &self.id, e))?;

        Ok(ApiKey {
            id,
            key: self.key,
            name: self.name,
            user_id: UserId::new(self.user_id),
            created_at: self.created_at,
            active: self.active,
        })
    }
}

/// Row type for presentation queries.
#[derive(FromRow)]
struct PresentationRow {
    id: String,
    user_id: String,
    data: Value,
    created_at: DateTime<Utc>,
}

impl PresentationRow {
    fn try_into_record(self) -> Result<PresentationRecord, sqlx::Error> {
        let id = PresentationId::from_str(&self.id)
            .map_err(|e| decode_error("presentation id", &self.id, e))?;

        Ok(PresentationRecord {
            id,
            user_id: UserId::new(self.user_id),
            data: crate::presentation::normalize_payload(self.data),
            created_at: self.created_at,
        })
    }
}

fn into_api_keys(rows: Vec<ApiKeyRow>) -> Result<Vec<ApiKey>, StoreError> {
    rows.into_iter()
        .map(|r| r.try_into_api_key().map_err(StoreError::from))
        .collect()
}

fn into_records(rows: Vec<PresentationRow>) -> Result<Vec<PresentationRecord>, StoreError> {
    rows.into_iter()
        .map(|r| r.try_into_record().map_err(StoreError::from))
        .collect()
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert_api_key(&self, key: &ApiKey) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO api_keys (id, key, name, user_id, created_at, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(key.id.to_string())
        .bind(&key.key)
        .bind(&key.name)
        .bind(key.user_id.as_str())
        .bind(key.created_at)
        .bind(key.active)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn active_keys_for_user(&self, user_id: &UserId) -> Result<Vec<ApiKey>, StoreError> {
        let rows: Vec<ApiKeyRow> = sqlx::query_as(
            r#"
            SELECT id, key, name, user_id, created_at, active
            FROM api_keys
            WHERE user_id = $1 AND active
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_api_keys(rows)
    }

    async fn find_active_key(&self, key: &str) -> Result<Option<ApiKey>, StoreError> {
        let row: Option<ApiKeyRow> = sqlx::query_as(
            r#"
            SELECT id, key, name, user_id, created_at, active
            FROM api_keys
            WHERE key = $1 AND active
            LIMIT 1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(r.try_into_api_key()?)),
            None => Ok(None),
        }
    }

    async fn insert_presentation(&self, record: &PresentationRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO presentations (id, user_id, data, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(record.id.to_string())
        .bind(record.user_id.as_str())
        .bind(&record.data)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn presentations_newest_first(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PresentationRecord>, StoreError> {
        let rows: Vec<PresentationRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, data, created_at
            FROM presentations
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }

    async fn presentations_unordered(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PresentationRecord>, StoreError> {
        let rows: Vec<PresentationRow> = sqlx::query_as(
            r#"
            SELECT id, user_id, data, created_at
            FROM presentations
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        into_records(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn malformed_url_is_a_connection_failure() {
        let Err(report) = PgRecordStore::connect("not a database url").await else {
            panic!("malformed url should not connect");
        };
        assert!(matches!(
            report.current_context(),
            StoreError::ConnectionFailed { .. }
        ));
    }
}
