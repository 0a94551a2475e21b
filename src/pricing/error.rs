// Error types for bulk price adjustment

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::catalog::CatalogError;
use crate::store::StoreError;

/// Main error type for preview, apply and undo
///
/// An empty candidate set is not an error; it is reported through the
/// result types with a zero count.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Rule was rejected before any work was done
    /// The message is shown to the caller as is
    #[error("{0}")]
    InvalidRule(String),

    /// Undo requested while no backup snapshot exists
    #[error("No backup available to restore")]
    NoBackupAvailable,

    /// Catalog query or lookup failed
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Option storage failed
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Request DTO failed field validation
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Result type alias for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

impl From<validator::ValidationErrors> for PricingError {
    fn from(err: validator::ValidationErrors) -> Self {
        PricingError::Validation(err.to_string())
    }
}

impl IntoResponse for PricingError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            PricingError::InvalidRule(_) => (StatusCode::BAD_REQUEST, "Invalid rule"),
            PricingError::NoBackupAvailable => (StatusCode::CONFLICT, "No backup available"),
            PricingError::Catalog(ref e) => {
                tracing::error!("Catalog error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An error occurred. Please try again.")
            }
            PricingError::Store(ref e) => {
                tracing::error!("Option store error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "An error occurred. Please try again.")
            }
            PricingError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation error"),
        };

        let details = match &self {
            PricingError::Catalog(_) | PricingError::Store(_) => error_message.to_string(),
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "details": details,
        }));

        (status, body).into_response()
    }
}
