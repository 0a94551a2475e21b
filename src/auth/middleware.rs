// Authentication extractor for the price management routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{error::AuthError, token::TokenService};

/// Capability required by every `/api` route
pub const MANAGE_PRICES: &str = "manage_prices";

/// Authenticated administrator allowed to manage prices
#[derive(Debug, Clone)]
pub struct PriceManager {
    pub user_id: i64,
    pub name: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for PriceManager
where
    S: Send + Sync,
    Arc<TokenService>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let endpoint = parts.uri.path().to_string();

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?
            .to_str()
            .map_err(|_| AuthError::InvalidToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidToken)?;

        let token_service = Arc::<TokenService>::from_ref(state);
        let claims = token_service.validate_token(token)?;

        if !claims.has_capability(MANAGE_PRICES) {
            warn!(
                "Authorization failed: user_id={}, endpoint={}",
                claims.sub, endpoint
            );
            return Err(AuthError::MissingCapability(MANAGE_PRICES.to_string()));
        }

        debug!("Authorization successful: user_id={}, endpoint={}", claims.sub, endpoint);
        Ok(PriceManager {
            user_id: claims.sub,
            name: claims.name,
        })
    }
}
