//! Backend REST client.
//!
//! Reads rows from the backend's PostgREST-style surface
//! (`/rest/v1/<table>?select=...&<column>=<op>.<value>`). Every request
//! carries the `apikey` header and a bearer token: the signed-in user's
//! access token when one is attached, the configured key otherwise.

use crate::config::{ConfigError, StoreConfig};
use crate::retry::{with_retry_if, RetryConfig};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

/// Backend client errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error ({status}): {message}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Error message from the API.
        message: String,
    },

    /// Invalid response from the API.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Authentication failed.
    #[error("Authentication failed")]
    AuthenticationFailed,

    /// Client misconfigured.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl StoreError {
    /// Check if the failure is transient and the request may be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            StoreError::RequestFailed(e) => e.is_timeout() || e.is_connect(),
            StoreError::ApiError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Get the HTTP status code to report for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::RequestFailed(e) if e.is_timeout() => 504,
            StoreError::RequestFailed(_) => 502,
            StoreError::ApiError { status, .. } => *status,
            StoreError::InvalidResponse(_) => 502,
            StoreError::AuthenticationFailed => 401,
            StoreError::Config(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::RequestFailed(_) => "BACKEND_UNREACHABLE",
            StoreError::ApiError { .. } => "BACKEND_ERROR",
            StoreError::InvalidResponse(_) => "BACKEND_INVALID_RESPONSE",
            StoreError::AuthenticationFailed => "BACKEND_AUTH_FAILED",
            StoreError::Config(_) => "CONFIG_ERROR",
        }
    }
}

/// Result type for backend calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Backend REST client.
#[derive(Clone)]
pub struct StoreClient {
    /// HTTP client instance.
    client: Client,

    /// Connection configuration.
    config: StoreConfig,

    /// Backoff for transient failures.
    retry: RetryConfig,

    /// Access token of the signed-in user, if acting on their behalf.
    access_token: Option<String>,
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient")
            .field("base_url", &self.config.base_url)
            .field("retry", &self.retry)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl StoreClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// `Config` without an API key, `RequestFailed` if the HTTP client
    /// cannot be built
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        if config.api_key().is_none() {
            return Err(ConfigError::MissingEnvVar("LIBRARY_BACKEND_ANON_KEY".to_string()).into());
        }

        let client = Client::builder().timeout(config.timeout()).build()?;
        let retry = RetryConfig::with_retries(config.max_retries);

        Ok(Self {
            client,
            config,
            retry,
            access_token: None,
        })
    }

    /// Create a client from environment variables.
    pub fn from_env() -> StoreResult<Self> {
        Self::new(StoreConfig::from_env())
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Act on behalf of a signed-in user; row-level security applies.
    pub fn with_access_token(&self, token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..self.clone()
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Select rows from `table`.
    ///
    /// `filters` are PostgREST column filters, e.g. `("id", query::eq("42"))`.
    #[instrument(skip(self, columns, filters))]
    pub async fn select<T>(
        &self,
        table: &str,
        columns: &str,
        filters: &[(&str, String)],
    ) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = self.config.rest_url(table);
        let mut query: Vec<(&str, String)> = Vec::with_capacity(filters.len() + 1);
        query.push(("select", columns.to_string()));
        query.extend(filters.iter().cloned());

        debug!(filters = filters.len(), "Selecting rows");

        with_retry_if(
            &self.retry,
            || self.get_rows(&url, &query),
            StoreError::is_retryable,
        )
        .await
    }

    /// Select the first matching row from `table`.
    pub async fn select_one<T>(
        &self,
        table: &str,
        columns: &str,
        filters: &[(&str, String)],
    ) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut filters = filters.to_vec();
        filters.push(("limit", "1".to_string()));
        let rows = self.select(table, columns, &filters).await?;
        Ok(rows.into_iter().next())
    }

    async fn get_rows<T>(&self, url: &str, query: &[(&str, String)]) -> StoreResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let request = self.authorize(self.client.get(url).query(query));
        let response = request.send().await?;
        self.handle_response(response).await
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let mut request = request.header("Accept", "application/json");
        if let Some(key) = self.config.api_key() {
            request = request.header("apikey", key);
        }
        match self.access_token.as_deref().or(self.config.api_key()) {
            Some(bearer) => request.header("Authorization", format!("Bearer {}", bearer)),
            None => request,
        }
    }

    async fn handle_response<T>(&self, response: reqwest::Response) -> StoreResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            error!("Backend authentication failed");
            return Err(StoreError::AuthenticationFailed);
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Backend API error ({}): {}", status.as_u16(), message);
            return Err(StoreError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))
    }
}
