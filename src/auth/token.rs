// JWT token generation and validation service

use crate::auth::error::AuthError;
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64, // user_id
    pub name: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    pub exp: i64, // expiration timestamp
    pub iat: i64, // issued at timestamp
}

impl Claims {
    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }
}

/// Token service for JWT operations
pub struct TokenService {
    secret: String,
    token_duration: i64, // in seconds
}

impl TokenService {
    /// Create a new TokenService with secret key
    /// Tokens expire after 8 hours (28800 seconds)
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            token_duration: 28800,
        }
    }

    /// Generate a token for an administrator
    pub fn generate_token(
        &self,
        user_id: i64,
        name: &str,
        capabilities: &[&str],
    ) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: user_id,
            name: name.to_string(),
            capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
            iat: now,
            exp: now + self.token_duration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Validate a token and return its claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })
    }
}
