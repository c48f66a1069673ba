//! Backend connection configuration.
//!
//! Loaded from environment variables with defaults pointing at a local
//! development stack.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Missing required environment variable.
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Connection settings for the backend REST surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Project URL (e.g., "https://project.backend.example").
    pub base_url: String,

    /// Public API key, sent as `apikey` on every request.
    pub anon_key: Option<String>,

    /// Service-role key. Bypasses row-level security; server-side only.
    pub service_key: Option<String>,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
}

impl Default for StoreConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            anon_key: None,
            service_key: None,
            timeout_secs: 10,
            max_retries: 2,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LIBRARY_BACKEND_URL`: project URL (default: http://localhost:54321)
    /// - `LIBRARY_BACKEND_ANON_KEY`: public API key
    /// - `LIBRARY_BACKEND_SERVICE_KEY`: service-role key
    /// - `LIBRARY_TIMEOUT_SECS`: request timeout in seconds (default: 10)
    /// - `LIBRARY_MAX_RETRIES`: retries for transient failures (default: 2)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            base_url: std::env::var("LIBRARY_BACKEND_URL").unwrap_or(default.base_url),
            anon_key: std::env::var("LIBRARY_BACKEND_ANON_KEY").ok(),
            service_key: std::env::var("LIBRARY_BACKEND_SERVICE_KEY").ok(),
            timeout_secs: std::env::var("LIBRARY_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.timeout_secs),
            max_retries: std::env::var("LIBRARY_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.max_retries),
        }
    }

    /// Configuration for a given URL and public key.
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            anon_key: Some(anon_key.into()),
            ..Default::default()
        }
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// URL of a table on the REST surface.
    pub fn rest_url(&self, table: &str) -> String {
        self.url(&format!("rest/v1/{}", table))
    }

    /// Key to authenticate with. The service key wins when both are set.
    pub fn api_key(&self) -> Option<&str> {
        self.service_key.as_deref().or(self.anon_key.as_deref())
    }

    /// Validate that the configuration can reach a deployed backend.
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        if self.anon_key.is_none() {
            return Err(ConfigError::MissingEnvVar("LIBRARY_BACKEND_ANON_KEY".to_string()));
        }

        let parsed = url::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            key: "LIBRARY_BACKEND_URL".to_string(),
            message: e.to_string(),
        })?;
        if parsed.scheme() != "https" {
            return Err(ConfigError::InvalidValue {
                key: "LIBRARY_BACKEND_URL".to_string(),
                message: "must use https".to_string(),
            });
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "LIBRARY_TIMEOUT_SECS".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
