//! Client configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local development.

use std::env;
use std::time::Duration;

const DEFAULT_AUTH_URL: &str = "https://identitytoolkit.googleapis.com/v1";
const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1";

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Firebase Web API key
    pub api_key: String,
    /// Realtime Database root, e.g. `https://<project>.firebaseio.com`
    pub database_url: String,
    /// Identity Toolkit base URL
    pub auth_url: String,
    /// Secure Token base URL (id token refresh)
    pub token_url: String,
    /// Timeout applied to every non-streaming HTTP request
    pub http_timeout: Duration,
    /// How long a transient notice stays visible
    pub notice_duration: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_key: "test_api_key".to_string(),
            database_url: "http://localhost:9000".to_string(),
            auth_url: "http://localhost:9099/identitytoolkit.googleapis.com/v1".to_string(),
            token_url: "http://localhost:9099/securetoken.googleapis.com/v1".to_string(),
            http_timeout: Duration::from_secs(10),
            notice_duration: Duration::from_millis(3000),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let database_url = env::var("FIREBASE_DATABASE_URL")
            .map_err(|_| ConfigError::Missing("FIREBASE_DATABASE_URL"))?;

        Ok(Self {
            api_key: env::var("FIREBASE_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("FIREBASE_API_KEY"))?,
            database_url: database_url.trim_end_matches('/').to_string(),
            auth_url: env::var("FIREBASE_AUTH_URL")
                .unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            token_url: env::var("FIREBASE_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_TOKEN_URL.to_string()),
            http_timeout: Duration::from_secs(parse_var("HTTP_TIMEOUT_SECS", 10)?),
            notice_duration: Duration::from_millis(parse_var("NOTICE_DURATION_MS", 3000)?),
        })
    }
}

fn parse_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
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
        env::set_var("FIREBASE_API_KEY", " test_key ");
        env::set_var("FIREBASE_DATABASE_URL", "https://catalog-test.firebaseio.com/");
        env::remove_var("HTTP_TIMEOUT_SECS");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.api_key, "test_key");
        assert_eq!(config.database_url, "https://catalog-test.firebaseio.com");
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.auth_url, DEFAULT_AUTH_URL);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("BOOK_CATALOG_TEST_NUMBER", "ten");
        let err = parse_var("BOOK_CATALOG_TEST_NUMBER", 1).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("BOOK_CATALOG_TEST_NUMBER", _)));
    }
}
