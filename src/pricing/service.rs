// Price Service
//
// Orchestrates preview, apply and undo over the injected catalog and option
// store. Apply and undo are serialised so their snapshot writes cannot
// interleave; preview runs without the lock.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::catalog::{Catalog, Product, Taxonomy, Term};
use crate::pricing::{
    activity_log::{ActivityEntry, ActivityLog},
    backup::{BackupLedger, BackupSnapshot},
    error::{PricingError, PricingResult},
    models::{Candidate, PriceChange},
    resolver::resolve,
    rule::{Rule, RuleRequest},
    scope::ScopeMatcher,
    settings::{Settings, SettingsRepository},
    stats::CatalogStatistics,
    types::TargetPriceKind,
};
use crate::store::OptionStore;

/// Number of changes shown by a preview
pub const PREVIEW_SAMPLE_SIZE: usize = 10;

const NO_MATCH_MESSAGE: &str = "No products found matching the specified criteria.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewResult {
    /// Total candidates the rule would touch
    pub count: usize,
    /// First changes in matcher order, at most `PREVIEW_SAMPLE_SIZE`
    pub sample: Vec<PriceChange>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyResult {
    pub matched: usize,
    /// Candidates whose new prices were persisted
    pub updated_count: usize,
    pub changes: Vec<PriceChange>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoResult {
    pub restored_count: usize,
    pub message: String,
}

/// Bulk price adjustment orchestrator
pub struct PriceService {
    catalog: Arc<dyn Catalog>,
    matcher: ScopeMatcher,
    backups: BackupLedger,
    activity: ActivityLog,
    settings: SettingsRepository,
    write_lock: Mutex<()>,
}

impl PriceService {
    pub fn new(catalog: Arc<dyn Catalog>, store: Arc<dyn OptionStore>) -> Self {
        Self {
            matcher: ScopeMatcher::new(catalog.clone()),
            catalog,
            backups: BackupLedger::new(store.clone()),
            activity: ActivityLog::new(store.clone()),
            settings: SettingsRepository::new(store),
            write_lock: Mutex::new(()),
        }
    }

    pub fn settings(&self) -> &SettingsRepository {
        &self.settings
    }

    /// Turn a submitted rule form into a rule, using the configured default rounding
    pub async fn rule_from_request(&self, request: RuleRequest) -> PricingResult<Rule> {
        let settings = self.settings.load().await?;
        request.into_rule(settings.default_rounding)
    }

    /// Count matching candidates and compute a sample of changes without mutating anything
    pub async fn preview(&self, rule: &Rule) -> PricingResult<PreviewResult> {
        rule.validate()?;

        let candidates = self.select(rule).await?;
        let count = candidates.len();
        let mut sample = Self::plan(&candidates, rule)?;
        sample.truncate(PREVIEW_SAMPLE_SIZE);

        let message = if count == 0 {
            NO_MATCH_MESSAGE.to_string()
        } else {
            format!("Preview shows {} products would be affected.", count)
        };

        Ok(PreviewResult { count, sample, message })
    }

    /// Rewrite prices for every candidate the rule selects
    ///
    /// Every change is computed before anything is written, so a rule whose
    /// arithmetic fails leaves the catalog and the previous backup untouched.
    /// The backup snapshot (when enabled) covers the whole candidate set and is
    /// written before the first mutation. A candidate whose write fails is
    /// skipped and not counted.
    pub async fn apply(&self, rule: &Rule, actor: Option<i64>) -> PricingResult<ApplyResult> {
        rule.validate()?;
        let _guard = self.write_lock.lock().await;

        let settings = self.settings.load().await?;
        let candidates = self.select(rule).await?;
        if candidates.is_empty() {
            return Ok(ApplyResult {
                matched: 0,
                updated_count: 0,
                changes: Vec::new(),
                message: NO_MATCH_MESSAGE.to_string(),
            });
        }

        let planned = Self::plan(&candidates, rule)?;

        if settings.backup_prices {
            self.backups
                .write(&BackupSnapshot::from_candidates(&candidates))
                .await?;
        }

        let mut changes = Vec::with_capacity(planned.len());
        for change in planned {
            match self
                .catalog
                .save_price_fields(change.id, &change.new_fields())
                .await
            {
                Ok(()) => changes.push(change),
                Err(e) => {
                    tracing::warn!("Skipping product {}: {}", change.id, e);
                }
            }
        }

        let updated_count = changes.len();
        self.record(&settings, ActivityEntry::apply(rule, updated_count, actor))
            .await;

        tracing::info!(
            "Applied rule '{}': {} of {} products updated",
            rule.describe(),
            updated_count,
            candidates.len()
        );

        Ok(ApplyResult {
            matched: candidates.len(),
            updated_count,
            changes,
            message: format!("Successfully updated prices for {} products.", updated_count),
        })
    }

    /// Restore the prices saved by the last apply and drop the snapshot
    pub async fn undo(&self, actor: Option<i64>) -> PricingResult<UndoResult> {
        let _guard = self.write_lock.lock().await;

        let snapshot = self
            .backups
            .read()
            .await?
            .ok_or(PricingError::NoBackupAvailable)?;

        let mut restored_count = 0;
        for (id, fields) in &snapshot.entries {
            match self.catalog.get_product(*id).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::debug!("Product {} no longer exists, skipping restore", id);
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Could not load product {} for restore: {}", id, e);
                    continue;
                }
            }

            match self.catalog.save_price_fields(*id, fields).await {
                Ok(()) => restored_count += 1,
                Err(e) => tracing::warn!("Failed to restore product {}: {}", id, e),
            }
        }

        self.backups.delete().await?;

        let settings = self.settings.load().await?;
        self.record(&settings, ActivityEntry::undo(restored_count, actor))
            .await;

        tracing::info!("Undo restored {} products", restored_count);

        Ok(UndoResult {
            restored_count,
            message: format!("Successfully restored prices for {} products.", restored_count),
        })
    }

    pub async fn has_backup(&self) -> PricingResult<bool> {
        self.backups.exists().await
    }

    pub async fn activity_logs(&self, limit: Option<usize>) -> PricingResult<Vec<ActivityEntry>> {
        self.activity.read(limit).await
    }

    pub async fn clear_logs(&self) -> PricingResult<()> {
        self.activity.clear().await
    }

    pub async fn statistics(&self) -> PricingResult<CatalogStatistics> {
        let mut stats = CatalogStatistics::collect(self.catalog.as_ref()).await?;
        stats.last_update = self.activity.last_update().await?;
        Ok(stats)
    }

    pub async fn terms(&self, taxonomy: Taxonomy) -> PricingResult<Vec<Term>> {
        Ok(self.catalog.list_terms(taxonomy).await?)
    }

    pub async fn search_products(&self, term: &str, limit: usize) -> PricingResult<Vec<Product>> {
        Ok(self.catalog.search_products(term, limit).await?)
    }

    /// Candidates for a rule; `sale_only` rules drop candidates without a sale
    async fn select(&self, rule: &Rule) -> PricingResult<Vec<Candidate>> {
        let mut candidates = self.matcher.select_candidates(&rule.scope).await?;
        if rule.target_price_kind == TargetPriceKind::SaleOnly {
            candidates.retain(Candidate::has_sale);
        }
        Ok(candidates)
    }

    /// Resolve every candidate up front; fails on the first arithmetic error
    fn plan(candidates: &[Candidate], rule: &Rule) -> PricingResult<Vec<PriceChange>> {
        let mut changes = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if let Some(change) = resolve(candidate, rule)? {
                changes.push(change);
            }
        }
        Ok(changes)
    }

    /// Append to the activity log if enabled; failures are logged and swallowed
    async fn record(&self, settings: &Settings, entry: ActivityEntry) {
        if !settings.enable_logging {
            return;
        }
        if let Err(e) = self.activity.append(entry, settings.max_log_entries).await {
            tracing::warn!("Failed to write activity log entry: {}", e);
        }
    }
}
