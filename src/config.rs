//! Application configuration loaded from environment variables.
//!
//! Secrets are read once at startup. On Cloud Run they arrive as
//! environment variables through secret bindings.

use std::env;

/// Default number of concurrent project lookups during achievement evaluation.
const DEFAULT_LOOKUP_CONCURRENCY: usize = 16;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL (CORS origin and logout redirect)
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Max concurrent Firestore reads when building a project index
    pub lookup_concurrency: usize,

    // --- Secrets ---
    /// Shared HS256 key used by the identity provider to sign session tokens
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?;
        if jwt_signing_key.len() < 32 {
            return Err(ConfigError::Invalid(
                "JWT_SIGNING_KEY",
                "must be at least 32 bytes".to_string(),
            ));
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parse_or("PORT", 8080)?,
            lookup_concurrency: parse_or("LOOKUP_CONCURRENCY", DEFAULT_LOOKUP_CONCURRENCY)?,
            jwt_signing_key: jwt_signing_key.into_bytes(),
        })
    }

    /// Config for tests only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            lookup_concurrency: DEFAULT_LOOKUP_CONCURRENCY,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!!".to_vec(),
        }
    }
}

/// Parse an optional numeric variable, falling back to `default` when unset.
fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, format!("'{}' is not a valid number", raw))),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!!");
        env::remove_var("PORT");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.jwt_signing_key, b"test_jwt_key_32_bytes_minimum!!!".to_vec());
        assert_eq!(config.port, 8080);
        assert!(config.lookup_concurrency > 0);
    }

    #[test]
    fn test_parse_or_default_when_unset() {
        env::remove_var("VOLUNTEER_TEST_UNSET_NUMBER");
        let value: u16 = parse_or("VOLUNTEER_TEST_UNSET_NUMBER", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_parse_or_rejects_garbage() {
        env::set_var("VOLUNTEER_TEST_BAD_NUMBER", "eighty");
        let result: Result<u16, _> = parse_or("VOLUNTEER_TEST_BAD_NUMBER", 8080);
        assert!(matches!(result, Err(ConfigError::Invalid(..))));
    }
}
