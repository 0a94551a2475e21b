// Backup/Undo Ledger
//
// Single-slot snapshot of the prices an apply is about to overwrite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::catalog::{PriceFields, ProductId};
use crate::pricing::{error::PricingResult, models::Candidate};
use crate::store::{OptionStore, StoreError};

pub const BACKUP_OPTION: &str = "price_tuner_price_backup";

/// Prices of every candidate of the most recent apply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupSnapshot {
    pub taken_at: DateTime<Utc>,
    pub entries: BTreeMap<ProductId, PriceFields>,
}

impl BackupSnapshot {
    pub fn from_candidates(candidates: &[Candidate]) -> Self {
        Self {
            taken_at: Utc::now(),
            entries: candidates
                .iter()
                .map(|candidate| (candidate.id, candidate.price_fields()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One generation of price history; every write replaces the previous snapshot
#[derive(Clone)]
pub struct BackupLedger {
    store: Arc<dyn OptionStore>,
}

impl BackupLedger {
    pub fn new(store: Arc<dyn OptionStore>) -> Self {
        Self { store }
    }

    pub async fn write(&self, snapshot: &BackupSnapshot) -> PricingResult<()> {
        let value = serde_json::to_value(snapshot).map_err(StoreError::from)?;
        self.store.update_option(BACKUP_OPTION, value).await?;
        tracing::debug!("Backup snapshot written with {} entries", snapshot.len());
        Ok(())
    }

    /// Current snapshot; an empty stored snapshot counts as none
    pub async fn read(&self) -> PricingResult<Option<BackupSnapshot>> {
        let Some(value) = self.store.get_option(BACKUP_OPTION).await? else {
            return Ok(None);
        };
        let snapshot: BackupSnapshot = serde_json::from_value(value).map_err(StoreError::from)?;
        Ok(Some(snapshot).filter(|snapshot| !snapshot.is_empty()))
    }

    pub async fn delete(&self) -> PricingResult<()> {
        self.store.delete_option(BACKUP_OPTION).await?;
        Ok(())
    }

    pub async fn exists(&self) -> PricingResult<bool> {
        Ok(self.read().await?.is_some())
    }
}
