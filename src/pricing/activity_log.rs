// Activity Log
//
// Bounded, newest-first record of apply and undo actions, stored as a single
// option. Entries beyond the configured maximum are dropped on every write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::pricing::{error::PricingResult, rule::Rule, types::ActionKind};
use crate::store::{OptionStore, StoreError};

pub const ACTIVITY_LOG_OPTION: &str = "price_tuner_activity_logs";
pub const LAST_UPDATE_OPTION: &str = "price_tuner_last_update";

/// One recorded action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// Unix seconds
    pub timestamp: i64,
    pub date: String,
    pub action: ActionKind,
    pub label: String,
    pub description: String,
    pub products_count: usize,
    /// Rule that was applied; absent for undo entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
    pub user_id: Option<i64>,
}

impl ActivityEntry {
    pub fn apply(rule: &Rule, products_count: usize, user_id: Option<i64>) -> Self {
        Self::new(
            ActionKind::Apply,
            format!("Applied {}. Affected {} products.", rule.describe(), products_count),
            products_count,
            Some(rule.clone()),
            user_id,
        )
    }

    pub fn undo(products_count: usize, user_id: Option<i64>) -> Self {
        Self::new(
            ActionKind::Undo,
            format!("Restored original prices for {} products.", products_count),
            products_count,
            None,
            user_id,
        )
    }

    fn new(
        action: ActionKind,
        description: String,
        products_count: usize,
        rule: Option<Rule>,
        user_id: Option<i64>,
    ) -> Self {
        let now: DateTime<Utc> = Utc::now();
        Self {
            timestamp: now.timestamp(),
            date: now.format("%Y-%m-%d %H:%M:%S").to_string(),
            action,
            label: action.label().to_string(),
            description,
            products_count,
            rule,
            user_id,
        }
    }
}

/// Activity log stored through the option store
#[derive(Clone)]
pub struct ActivityLog {
    store: Arc<dyn OptionStore>,
}

impl ActivityLog {
    pub fn new(store: Arc<dyn OptionStore>) -> Self {
        Self { store }
    }

    /// Prepend an entry, keep at most `max_entries`, and stamp the last update time
    pub async fn append(&self, entry: ActivityEntry, max_entries: usize) -> PricingResult<()> {
        let timestamp = entry.timestamp;
        let mut entries = self.load().await?;
        entries.insert(0, entry);
        entries.truncate(max_entries);

        let value = serde_json::to_value(&entries).map_err(StoreError::from)?;
        self.store.update_option(ACTIVITY_LOG_OPTION, value).await?;
        self.store
            .update_option(LAST_UPDATE_OPTION, json!(timestamp))
            .await?;
        Ok(())
    }

    /// Newest entries first, at most `limit` when given
    pub async fn read(&self, limit: Option<usize>) -> PricingResult<Vec<ActivityEntry>> {
        let mut entries = self.load().await?;
        if let Some(limit) = limit {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    pub async fn clear(&self) -> PricingResult<()> {
        self.store.delete_option(ACTIVITY_LOG_OPTION).await?;
        tracing::info!("Activity log cleared");
        Ok(())
    }

    /// Unix time of the most recent logged apply or undo
    pub async fn last_update(&self) -> PricingResult<Option<i64>> {
        Ok(self
            .store
            .get_option(LAST_UPDATE_OPTION)
            .await?
            .and_then(|value| value.as_i64()))
    }

    async fn load(&self) -> PricingResult<Vec<ActivityEntry>> {
        match self.store.get_option(ACTIVITY_LOG_OPTION).await? {
            Some(value) => Ok(serde_json::from_value(value).map_err(StoreError::from)?),
            None => Ok(Vec::new()),
        }
    }
}
