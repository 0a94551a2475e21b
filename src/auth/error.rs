// Authentication and authorization error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

/// Authentication and authorization error types
#[derive(Debug)]
pub enum AuthError {
    InvalidToken,
    ExpiredToken,
    MissingToken,
    TokenGenerationError(String),

    /// Token is valid but lacks the capability the route requires
    MissingCapability(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidToken => write!(f, "Invalid token"),
            AuthError::ExpiredToken => write!(f, "Token has expired"),
            AuthError::MissingToken => write!(f, "Missing authentication token"),
            AuthError::TokenGenerationError(msg) => write!(f, "Token generation error: {}", msg),
            AuthError::MissingCapability(capability) => {
                write!(f, "Insufficient permissions: '{}' capability required", capability)
            }
        }
    }
}

impl std::error::Error for AuthError {}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidToken | AuthError::ExpiredToken | AuthError::MissingToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::TokenGenerationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::MissingCapability(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            AuthError::InvalidToken => {
                warn!("Invalid token attempt");
                self.to_string()
            }
            AuthError::ExpiredToken => {
                warn!("Expired token attempt");
                self.to_string()
            }
            AuthError::MissingToken => {
                warn!("Missing token in request");
                self.to_string()
            }
            AuthError::TokenGenerationError(msg) => {
                error!("Token generation error: {}", msg);
                "Internal server error".to_string()
            }
            AuthError::MissingCapability(capability) => {
                warn!("Authorization failed: missing capability '{}'", capability);
                self.to_string()
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (self.status_code(), body).into_response()
    }
}
