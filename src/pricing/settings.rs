// Runtime settings stored as a single option

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::pricing::{error::PricingResult, types::RoundingKind};
use crate::store::{OptionStore, StoreError};

pub const SETTINGS_OPTION: &str = "price_tuner_settings";

/// Settings that change how apply and the activity log behave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enable_logging: bool,
    pub max_log_entries: usize,
    /// Snapshot prices before every apply so it can be undone
    pub backup_prices: bool,
    /// Rounding used when a rule request leaves it out
    pub default_rounding: RoundingKind,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enable_logging: true,
            max_log_entries: 1000,
            backup_prices: true,
            default_rounding: RoundingKind::End99,
        }
    }
}

/// Partial settings update; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    pub enable_logging: Option<bool>,
    #[validate(range(min = 1, max = 100000, message = "max_log_entries must be between 1 and 100000"))]
    pub max_log_entries: Option<usize>,
    pub backup_prices: Option<bool>,
    pub default_rounding: Option<RoundingKind>,
}

impl UpdateSettingsRequest {
    fn merge_into(self, settings: &mut Settings) {
        if let Some(enable_logging) = self.enable_logging {
            settings.enable_logging = enable_logging;
        }
        if let Some(max_log_entries) = self.max_log_entries {
            settings.max_log_entries = max_log_entries;
        }
        if let Some(backup_prices) = self.backup_prices {
            settings.backup_prices = backup_prices;
        }
        if let Some(default_rounding) = self.default_rounding {
            settings.default_rounding = default_rounding;
        }
    }
}

/// Loads and saves `Settings` through the option store
#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<dyn OptionStore>,
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn OptionStore>) -> Self {
        Self { store }
    }

    /// Current settings, or the defaults when none were saved
    pub async fn load(&self) -> PricingResult<Settings> {
        match self.store.get_option(SETTINGS_OPTION).await? {
            Some(value) => Ok(serde_json::from_value(value).map_err(StoreError::from)?),
            None => Ok(Settings::default()),
        }
    }

    pub async fn save(&self, settings: &Settings) -> PricingResult<()> {
        let value = serde_json::to_value(settings).map_err(StoreError::from)?;
        self.store.update_option(SETTINGS_OPTION, value).await?;
        Ok(())
    }

    /// Validate and merge a partial update, returning the saved settings
    pub async fn update(&self, request: UpdateSettingsRequest) -> PricingResult<Settings> {
        request.validate()?;

        let mut settings = self.load().await?;
        request.merge_into(&mut settings);
        self.save(&settings).await?;

        tracing::info!("Settings updated: {:?}", settings);
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::error::PricingError;
    use crate::store::MemoryOptionStore;
    use serde_json::json;

    fn repository() -> (Arc<MemoryOptionStore>, SettingsRepository) {
        let store = Arc::new(MemoryOptionStore::new());
        (store.clone(), SettingsRepository::new(store))
    }

    #[tokio::test]
    async fn test_load_defaults_when_unset() {
        let (_, repo) = repository();
        let settings = repo.load().await.unwrap();
        assert!(settings.enable_logging);
        assert_eq!(settings.max_log_entries, 1000);
        assert!(settings.backup_prices);
        assert_eq!(settings.default_rounding, RoundingKind::End99);
    }

    #[tokio::test]
    async fn test_load_fills_missing_fields() {
        let (store, repo) = repository();
        store
            .update_option(SETTINGS_OPTION, json!({"backup_prices": false}))
            .await
            .unwrap();

        let settings = repo.load().await.unwrap();
        assert!(!settings.backup_prices);
        assert_eq!(settings.max_log_entries, 1000);
    }

    #[tokio::test]
    async fn test_update_merges_and_persists() {
        let (_, repo) = repository();
        let updated = repo
            .update(UpdateSettingsRequest {
                max_log_entries: Some(5),
                default_rounding: Some(RoundingKind::Whole),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.max_log_entries, 5);
        assert!(updated.enable_logging);
        assert_eq!(repo.load().await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_rejects_out_of_range_log_size() {
        let (_, repo) = repository();
        let result = repo
            .update(UpdateSettingsRequest {
                max_log_entries: Some(0),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(PricingError::Validation(_))));
    }
}
