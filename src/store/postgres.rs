// PostgreSQL option store backed by the `options` table

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use super::{OptionStore, StoreError};

#[derive(Clone)]
pub struct PgOptionStore {
    pool: PgPool,
}

impl PgOptionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OptionStore for PgOptionStore {
    async fn get_option(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        let value = sqlx::query_scalar::<_, JsonValue>(
            "SELECT option_value FROM options WHERE option_key = $1",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn update_option(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO options (option_key, option_value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (option_key)
            DO UPDATE SET option_value = EXCLUDED.option_value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        tracing::debug!("Option '{}' updated", key);
        Ok(())
    }

    async fn delete_option(&self, key: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM options WHERE option_key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
