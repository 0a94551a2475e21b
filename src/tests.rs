// Handler tests for the Price Tuner API
// Exercises the router end to end over the in-memory catalog and option store

use super::*;
use crate::auth::MANAGE_PRICES;
use crate::catalog::{MemoryCatalog, Product, ProductKind, ProductStatus, Term, Taxonomy};
use crate::pricing::{ActivityEntry, ApplyResult, PreviewResult, Settings, UndoResult};
use crate::store::MemoryOptionStore;
use axum::http::{header, HeaderValue, StatusCode};
use axum_test::TestServer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::json;

const SECRET: &str = "test_secret_key_for_testing_purposes";

// ============================================================================
// Test Helpers
// ============================================================================

/// Helper function to create a test app with a small seeded catalog
async fn create_test_app() -> (Arc<MemoryCatalog>, TestServer) {
    let catalog = Arc::new(MemoryCatalog::new());
    for (id, price) in [(1, dec!(10.00)), (2, dec!(25.00)), (3, dec!(80.00))] {
        catalog
            .insert(Product {
                id,
                parent_id: None,
                name: format!("Mug {}", id),
                sku: format!("MUG-{}", id),
                kind: ProductKind::Simple,
                status: ProductStatus::Publish,
                regular_price: Some(price),
                sale_price: None,
                category_ids: vec![5],
                tag_ids: vec![],
            })
            .await;
    }
    catalog
        .insert_term(Term {
            id: 5,
            taxonomy: Taxonomy::Category,
            name: "Kitchen".to_string(),
            slug: "kitchen".to_string(),
            count: 0,
        })
        .await;

    let state = AppState::new(
        catalog.clone(),
        Arc::new(MemoryOptionStore::new()),
        TokenService::new(SECRET.to_string()),
    );
    (catalog, TestServer::new(create_router(state)).unwrap())
}

/// Bearer header for a user holding the given capabilities
fn bearer(capabilities: &[&str]) -> HeaderValue {
    let token = TokenService::new(SECRET.to_string())
        .generate_token(1, "admin", capabilities)
        .unwrap();
    HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
}

fn manager() -> HeaderValue {
    bearer(&[MANAGE_PRICES])
}

fn percentage_rule(value: i64) -> serde_json::Value {
    json!({
        "adjustment_kind": "percentage",
        "adjustment_value": value,
        "scope": { "kind": "all" }
    })
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let (_, server) = create_test_app().await;
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (_, server) = create_test_app().await;
    let response = server.post("/api/prices/preview").json(&percentage_rule(10)).await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_capability_is_forbidden() {
    let (_, server) = create_test_app().await;
    let response = server
        .get("/api/prices/stats")
        .add_header(header::AUTHORIZATION, bearer(&["edit_posts"]))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

// ============================================================================
// Preview / Apply / Undo
// ============================================================================

#[tokio::test]
async fn test_preview_structured_rule() {
    let (catalog, server) = create_test_app().await;
    let response = server
        .post("/api/prices/preview")
        .add_header(header::AUTHORIZATION, manager())
        .json(&percentage_rule(10))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let preview: PreviewResult = response.json();
    assert_eq!(preview.count, 3);
    assert_eq!(preview.sample[0].new_regular, dec!(11.00));

    let untouched = catalog.get_product(1).await.unwrap().unwrap();
    assert_eq!(untouched.regular_price, Some(dec!(10.00)));
}

#[tokio::test]
async fn test_preview_form_rule() {
    let (_, server) = create_test_app().await;
    let response = server
        .post("/api/prices/preview")
        .add_header(header::AUTHORIZATION, manager())
        .json(&json!({
            "rule_type": "fixed",
            "rule_value": "5",
            "target_scope": "price_range",
            "price_min": "20",
            "price_max": "50"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let preview: PreviewResult = response.json();
    assert_eq!(preview.count, 1);
    assert_eq!(preview.sample[0].id, 2);
}

#[tokio::test]
async fn test_invalid_rule_is_bad_request() {
    let (_, server) = create_test_app().await;
    let response = server
        .post("/api/prices/apply")
        .add_header(header::AUTHORIZATION, manager())
        .json(&percentage_rule(0))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["details"], "Rule value cannot be zero.");
}

#[tokio::test]
async fn test_malformed_structured_rule_is_bad_request() {
    let (_, server) = create_test_app().await;
    let response = server
        .post("/api/prices/preview")
        .add_header(header::AUTHORIZATION, manager())
        .json(&json!({ "adjustment_kind": "percent", "adjustment_value": 10 }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    let details = body["details"].as_str().unwrap();
    assert!(details.contains("unknown variant"), "unexpected details: {}", details);
}

#[tokio::test]
async fn test_overflowing_rule_is_bad_request() {
    let (catalog, server) = create_test_app().await;
    let response = server
        .post("/api/prices/apply")
        .add_header(header::AUTHORIZATION, manager())
        .json(&json!({ "adjustment_kind": "fixed", "adjustment_value": Decimal::MAX.to_string() }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let product = catalog.get_product(1).await.unwrap().unwrap();
    assert_eq!(product.regular_price, Some(dec!(10.00)));
}

#[tokio::test]
async fn test_apply_then_undo() {
    let (catalog, server) = create_test_app().await;

    let response = server
        .post("/api/prices/apply")
        .add_header(header::AUTHORIZATION, manager())
        .json(&percentage_rule(-50))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let applied: ApplyResult = response.json();
    assert_eq!(applied.updated_count, 3);
    let product = catalog.get_product(3).await.unwrap().unwrap();
    assert_eq!(product.regular_price, Some(dec!(40.00)));

    let response = server
        .post("/api/prices/undo")
        .add_header(header::AUTHORIZATION, manager())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let undone: UndoResult = response.json();
    assert_eq!(undone.restored_count, 3);
    let product = catalog.get_product(3).await.unwrap().unwrap();
    assert_eq!(product.regular_price, Some(dec!(80.00)));

    let response = server
        .post("/api/prices/undo")
        .add_header(header::AUTHORIZATION, manager())
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_logs_and_clear() {
    let (_, server) = create_test_app().await;
    server
        .post("/api/prices/apply")
        .add_header(header::AUTHORIZATION, manager())
        .json(&percentage_rule(5))
        .await;

    let response = server
        .get("/api/prices/logs")
        .add_header(header::AUTHORIZATION, manager())
        .await;
    let logs: Vec<ActivityEntry> = response.json();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].user_id, Some(1));
    assert_eq!(logs[0].products_count, 3);

    let response = server
        .delete("/api/prices/logs")
        .add_header(header::AUTHORIZATION, manager())
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let response = server
        .get("/api/prices/logs")
        .add_header(header::AUTHORIZATION, manager())
        .await;
    let logs: Vec<ActivityEntry> = response.json();
    assert!(logs.is_empty());
}

// ============================================================================
// Settings, stats and catalog lookups
// ============================================================================

#[tokio::test]
async fn test_update_settings() {
    let (_, server) = create_test_app().await;
    let response = server
        .put("/api/settings")
        .add_header(header::AUTHORIZATION, manager())
        .json(&json!({ "max_log_entries": 50, "default_rounding": "end_95" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let settings: Settings = response.json();
    assert_eq!(settings.max_log_entries, 50);
    assert!(settings.backup_prices);

    let response = server
        .get("/api/settings")
        .add_header(header::AUTHORIZATION, manager())
        .await;
    let stored: Settings = response.json();
    assert_eq!(stored, settings);
}

#[tokio::test]
async fn test_update_settings_validation() {
    let (_, server) = create_test_app().await;
    let response = server
        .put("/api/settings")
        .add_header(header::AUTHORIZATION, manager())
        .json(&json!({ "max_log_entries": 0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats() {
    let (_, server) = create_test_app().await;
    let response = server
        .get("/api/prices/stats")
        .add_header(header::AUTHORIZATION, manager())
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_products"], 3);
}

#[tokio::test]
async fn test_terms_and_search() {
    let (_, server) = create_test_app().await;

    let response = server
        .get("/api/catalog/terms/categories")
        .add_header(header::AUTHORIZATION, manager())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let terms: Vec<Term> = response.json();
    assert_eq!(terms[0].count, 3);

    let response = server
        .get("/api/catalog/search")
        .add_query_param("q", "mug-2")
        .add_header(header::AUTHORIZATION, manager())
        .await;
    let products: Vec<Product> = response.json();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, 2);

    let response = server
        .get("/api/catalog/search")
        .add_header(header::AUTHORIZATION, manager())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
