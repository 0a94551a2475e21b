// Pricing Module
//
// Bulk price adjustment: rules, price arithmetic, candidate selection,
// the single-slot backup, the activity log and the orchestrating service.

pub mod activity_log;
pub mod backup;
pub mod calculator;
pub mod error;
pub mod handlers;
pub mod models;
pub mod resolver;
pub mod rule;
pub mod scope;
pub mod service;
pub mod settings;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use activity_log::{ActivityEntry, ActivityLog};
pub use backup::{BackupLedger, BackupSnapshot};
pub use calculator::PriceCalculator;
pub use error::{PricingError, PricingResult};
pub use models::{Candidate, PriceChange};
pub use resolver::resolve;
pub use rule::{Rule, RuleRequest, Scope};
pub use scope::ScopeMatcher;
pub use service::{ApplyResult, PreviewResult, PriceService, UndoResult, PREVIEW_SAMPLE_SIZE};
pub use settings::{Settings, SettingsRepository, UpdateSettingsRequest};
pub use stats::{CatalogStatistics, PriceBuckets};
pub use types::{
    ActionKind, AdjustmentKind, ChangeDirection, RoundingKind, ScopeKind, TargetPriceKind,
    TouchedFields,
};
