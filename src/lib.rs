pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod pricing;
pub mod store;

use axum::{
    extract::FromRef,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use auth::TokenService;
use catalog::Catalog;
use pricing::{handlers, PriceService};
use store::OptionStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub price_service: Arc<PriceService>,
    pub token_service: Arc<TokenService>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        options: Arc<dyn OptionStore>,
        token_service: TokenService,
    ) -> Self {
        Self {
            price_service: Arc::new(PriceService::new(catalog, options)),
            token_service: Arc::new(token_service),
        }
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.token_service.clone()
    }
}

/// Handler for GET /health
async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS and request tracing
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/prices/preview", post(handlers::preview_handler))
        .route("/api/prices/apply", post(handlers::apply_handler))
        .route("/api/prices/undo", post(handlers::undo_handler))
        .route(
            "/api/prices/logs",
            get(handlers::list_logs_handler).delete(handlers::clear_logs_handler),
        )
        .route("/api/prices/stats", get(handlers::stats_handler))
        .route(
            "/api/settings",
            get(handlers::get_settings_handler).put(handlers::update_settings_handler),
        )
        .route("/api/catalog/terms/:taxonomy", get(handlers::list_terms_handler))
        .route("/api/catalog/search", get(handlers::search_products_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests;
