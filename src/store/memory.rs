// In-memory option store

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{OptionStore, StoreError};

#[derive(Debug, Default)]
pub struct MemoryOptionStore {
    options: RwLock<HashMap<String, JsonValue>>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OptionStore for MemoryOptionStore {
    async fn get_option(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        Ok(self.options.read().await.get(key).cloned())
    }

    async fn update_option(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        self.options.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete_option(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.options.write().await.remove(key).is_some())
    }
}
