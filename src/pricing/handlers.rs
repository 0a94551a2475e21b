// HTTP handlers for price management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::auth::PriceManager;
use crate::catalog::{Product, Taxonomy, Term};
use crate::pricing::{
    activity_log::ActivityEntry,
    error::{PricingError, PricingResult},
    rule::{Rule, RuleRequest},
    service::{ApplyResult, PreviewResult, UndoResult},
    settings::{Settings, UpdateSettingsRequest},
    stats::CatalogStatistics,
};
use crate::AppState;

const DEFAULT_LOG_LIMIT: usize = 100;
const DEFAULT_SEARCH_LIMIT: usize = 50;
const MAX_SEARCH_LIMIT: usize = 200;

/// Rule body: either the structured rule or the flat admin form
///
/// A body carrying `adjustment_kind` is the structured rule and its parse
/// errors are reported as such; anything else is read as the form.
#[derive(Debug)]
pub enum RulePayload {
    Rule(Rule),
    Form(RuleRequest),
}

impl RulePayload {
    pub fn from_json(value: Value) -> PricingResult<Self> {
        let parsed = if value.get("adjustment_kind").is_some() {
            serde_json::from_value(value).map(RulePayload::Rule)
        } else {
            serde_json::from_value(value).map(RulePayload::Form)
        };
        parsed.map_err(|e| PricingError::InvalidRule(format!("Invalid rule: {}", e)))
    }

    async fn into_rule(self, state: &AppState) -> PricingResult<Rule> {
        match self {
            RulePayload::Rule(rule) => Ok(rule),
            RulePayload::Form(form) => state.price_service.rule_from_request(form).await,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

/// Handler for POST /api/prices/preview
pub async fn preview_handler(
    State(state): State<AppState>,
    _user: PriceManager,
    Json(body): Json<Value>,
) -> Result<Json<PreviewResult>, PricingError> {
    let rule = RulePayload::from_json(body)?.into_rule(&state).await?;
    let preview = state.price_service.preview(&rule).await?;
    Ok(Json(preview))
}

/// Handler for POST /api/prices/apply
pub async fn apply_handler(
    State(state): State<AppState>,
    user: PriceManager,
    Json(body): Json<Value>,
) -> Result<Json<ApplyResult>, PricingError> {
    let rule = RulePayload::from_json(body)?.into_rule(&state).await?;
    let result = state.price_service.apply(&rule, Some(user.user_id)).await?;
    Ok(Json(result))
}

/// Handler for POST /api/prices/undo
pub async fn undo_handler(
    State(state): State<AppState>,
    user: PriceManager,
) -> Result<Json<UndoResult>, PricingError> {
    let result = state.price_service.undo(Some(user.user_id)).await?;
    Ok(Json(result))
}

/// Handler for GET /api/prices/logs
pub async fn list_logs_handler(
    State(state): State<AppState>,
    _user: PriceManager,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<ActivityEntry>>, PricingError> {
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    let entries = state.price_service.activity_logs(Some(limit)).await?;
    Ok(Json(entries))
}

/// Handler for DELETE /api/prices/logs
pub async fn clear_logs_handler(
    State(state): State<AppState>,
    _user: PriceManager,
) -> Result<StatusCode, PricingError> {
    state.price_service.clear_logs().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/prices/stats
pub async fn stats_handler(
    State(state): State<AppState>,
    _user: PriceManager,
) -> Result<Json<CatalogStatistics>, PricingError> {
    let stats = state.price_service.statistics().await?;
    Ok(Json(stats))
}

/// Handler for GET /api/settings
pub async fn get_settings_handler(
    State(state): State<AppState>,
    _user: PriceManager,
) -> Result<Json<Settings>, PricingError> {
    let settings = state.price_service.settings().load().await?;
    Ok(Json(settings))
}

/// Handler for PUT /api/settings
pub async fn update_settings_handler(
    State(state): State<AppState>,
    _user: PriceManager,
    Json(request): Json<UpdateSettingsRequest>,
) -> Result<Json<Settings>, PricingError> {
    let settings = state.price_service.settings().update(request).await?;
    Ok(Json(settings))
}

/// Handler for GET /api/catalog/terms/:taxonomy
pub async fn list_terms_handler(
    State(state): State<AppState>,
    _user: PriceManager,
    Path(taxonomy): Path<Taxonomy>,
) -> Result<Json<Vec<Term>>, PricingError> {
    let terms = state.price_service.terms(taxonomy).await?;
    Ok(Json(terms))
}

fn search_limit(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT)
}

/// Handler for GET /api/catalog/search
pub async fn search_products_handler(
    State(state): State<AppState>,
    _user: PriceManager,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, PricingError> {
    let term = query.q.trim();
    if term.is_empty() {
        return Err(PricingError::Validation("Search term is required".to_string()));
    }
    let products = state.price_service.search_products(term, search_limit(query.limit)).await?;
    Ok(Json(products))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::types::AdjustmentKind;
    use serde_json::json;

    #[test]
    fn test_payload_accepts_structured_rule() {
        let payload = RulePayload::from_json(json!({
            "adjustment_kind": "fixed",
            "adjustment_value": "2.5",
            "scope": { "kind": "tags", "ids": [1] }
        }))
        .unwrap();
        match payload {
            RulePayload::Rule(rule) => assert_eq!(rule.adjustment_kind, AdjustmentKind::Fixed),
            other => panic!("expected structured rule, got {:?}", other),
        }
    }

    #[test]
    fn test_payload_falls_back_to_form() {
        let payload =
            RulePayload::from_json(json!({ "rule_type": "percentage", "rule_value": "10" })).unwrap();
        assert!(matches!(payload, RulePayload::Form(_)));
    }

    #[test]
    fn test_malformed_structured_rule_reports_its_own_error() {
        let result = RulePayload::from_json(json!({
            "adjustment_kind": "percent",
            "adjustment_value": 10
        }));
        match result {
            Err(PricingError::InvalidRule(message)) => {
                assert!(message.contains("percent"), "unexpected message: {}", message);
                assert!(!message.contains("Rule value is required"));
            }
            other => panic!("expected InvalidRule, got {:?}", other),
        }
    }

    #[test]
    fn test_search_limit_is_capped() {
        assert_eq!(search_limit(None), DEFAULT_SEARCH_LIMIT);
        assert_eq!(search_limit(Some(5)), 5);
        assert_eq!(search_limit(Some(usize::MAX)), MAX_SEARCH_LIMIT);
    }
}
