// Option Store
//
// Key-value storage for JSON option values. Settings, the price backup
// snapshot and the activity log all live here.

pub mod memory;
pub mod postgres;

pub use memory::MemoryOptionStore;
pub use postgres::PgOptionStore;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Errors raised by option store backends
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored value did not match the expected shape
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value option storage
#[async_trait]
pub trait OptionStore: Send + Sync {
    /// Read an option; `None` when the key has never been written
    async fn get_option(&self, key: &str) -> Result<Option<JsonValue>, StoreError>;

    /// Insert or overwrite an option
    async fn update_option(&self, key: &str, value: JsonValue) -> Result<(), StoreError>;

    /// Remove an option, returning whether it existed
    async fn delete_option(&self, key: &str) -> Result<bool, StoreError>;
}
