// Server configuration read from the environment (and `.env` via dotenv)

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    MissingVar(&'static str),

    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Postgres connection string; in-memory stores are used when unset
    pub database_url: Option<String>,
    pub jwt_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidPort(value))?,
            None => 8080,
        };
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::MissingVar("JWT_SECRET"))?;

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s3cret")])).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:8080");
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let result = AppConfig::from_lookup(lookup(&[]));
        assert!(matches!(result, Err(ConfigError::MissingVar("JWT_SECRET"))));
    }

    #[test]
    fn test_invalid_port() {
        let result = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "x"), ("PORT", "http")]));
        assert!(matches!(result, Err(ConfigError::InvalidPort(_))));
    }

    #[test]
    fn test_database_url_is_read() {
        let config = AppConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "x"),
            ("DATABASE_URL", "postgres://localhost/shop"),
            ("PORT", "3000"),
        ]))
        .unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/shop"));
    }
}
