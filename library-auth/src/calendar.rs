//! Calendar provider OAuth
//!
//! Users connect a calendar so upcoming cases can be added as events. The
//! connection is a standard authorization-code flow with PKCE against
//! Google or Microsoft Outlook.

use crate::error::{AuthError, AuthResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// How long an OAuth state stays valid.
pub const STATE_TTL_SECS: i64 = 600;

/// Supported calendar providers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CalendarProvider {
    /// Google Calendar
    Google,
    /// Microsoft Outlook / Office 365
    Outlook,
}

impl CalendarProvider {
    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarProvider::Google => "google",
            CalendarProvider::Outlook => "outlook",
        }
    }

    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "google" | "gcal" => Some(CalendarProvider::Google),
            "outlook" | "microsoft" | "office365" | "o365" => Some(CalendarProvider::Outlook),
            _ => None,
        }
    }

    /// Get the authorization endpoint.
    pub fn auth_url(&self) -> &'static str {
        match self {
            CalendarProvider::Google => "https://accounts.google.com/o/oauth2/v2/auth",
            CalendarProvider::Outlook => {
                "https://login.microsoftonline.com/common/oauth2/v2.0/authorize"
            }
        }
    }

    /// Get the token endpoint.
    pub fn token_url(&self) -> &'static str {
        match self {
            CalendarProvider::Google => "https://oauth2.googleapis.com/token",
            CalendarProvider::Outlook => "https://login.microsoftonline.com/common/oauth2/v2.0/token",
        }
    }

    /// Get default scopes for event creation.
    pub fn default_scopes(&self) -> Vec<&'static str> {
        match self {
            CalendarProvider::Google => vec!["https://www.googleapis.com/auth/calendar.events"],
            CalendarProvider::Outlook => vec!["offline_access", "Calendars.ReadWrite"],
        }
    }

    /// Extra authorization parameters needed to obtain a refresh token.
    fn offline_params(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            CalendarProvider::Google => &[("access_type", "offline"), ("prompt", "consent")],
            CalendarProvider::Outlook => &[],
        }
    }
}

/// Calendar OAuth client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarOAuthConfig {
    /// Provider type
    pub provider: CalendarProvider,

    /// Client ID
    pub client_id: String,

    /// Client secret
    pub client_secret: String,

    /// Authorization URL override
    pub auth_url: Option<String>,

    /// Token URL override
    pub token_url: Option<String>,

    /// Redirect URL
    pub redirect_url: String,

    /// Scopes to request
    pub scopes: Vec<String>,
}

impl CalendarOAuthConfig {
    /// Create a new configuration with the provider's default scopes.
    pub fn new(
        provider: CalendarProvider,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: None,
            token_url: None,
            redirect_url: redirect_url.into(),
            scopes: provider
                .default_scopes()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    /// Load a provider's configuration from environment variables.
    ///
    /// Environment variables (`<P>` is `GOOGLE` or `OUTLOOK`):
    /// - `LIBRARY_<P>_CLIENT_ID` (required)
    /// - `LIBRARY_<P>_CLIENT_SECRET` (required)
    /// - `LIBRARY_CALENDAR_REDIRECT_URL` (default: http://localhost:5173/calendar/callback)
    pub fn from_env(provider: CalendarProvider) -> AuthResult<Self> {
        let prefix = provider.as_str().to_uppercase();
        let required = |key: String| {
            std::env::var(&key).map_err(|_| AuthError::ConfigError(format!("{} is not set", key)))
        };

        let client_id = required(format!("LIBRARY_{}_CLIENT_ID", prefix))?;
        let client_secret = required(format!("LIBRARY_{}_CLIENT_SECRET", prefix))?;
        let redirect_url = std::env::var("LIBRARY_CALENDAR_REDIRECT_URL")
            .unwrap_or_else(|_| "http://localhost:5173/calendar/callback".to_string());

        Ok(Self::new(provider, client_id, client_secret, redirect_url))
    }

    /// Get the authorization URL.
    pub fn get_auth_url(&self) -> &str {
        self.auth_url.as_deref().unwrap_or(self.provider.auth_url())
    }

    /// Get the token URL.
    pub fn get_token_url(&self) -> &str {
        self.token_url.as_deref().unwrap_or(self.provider.token_url())
    }

    /// Build the URL the user is sent to for consent.
    ///
    /// Includes the S256 PKCE challenge when the state carries a verifier.
    ///
    /// # Example
    ///
    /// ```
    /// use library_auth::calendar::{CalendarOAuthConfig, CalendarProvider, OAuthState};
    ///
    /// let config = CalendarOAuthConfig::new(
    ///     CalendarProvider::Google,
    ///     "client-id",
    ///     "secret",
    ///     "https://library.example/calendar/callback",
    /// );
    /// let state = OAuthState::with_pkce(CalendarProvider::Google);
    /// let url = config.authorization_url(&state).unwrap();
    ///
    /// assert!(url.starts_with("https://accounts.google.com/"));
    /// assert!(url.contains("code_challenge_method=S256"));
    /// ```
    pub fn authorization_url(&self, state: &OAuthState) -> AuthResult<String> {
        let scope = self.scopes.join(" ");
        let mut params: Vec<(&str, &str)> = vec![
            ("response_type", "code"),
            ("client_id", &self.client_id),
            ("redirect_uri", &self.redirect_url),
            ("scope", &scope),
            ("state", &state.state),
        ];
        params.extend_from_slice(self.provider.offline_params());

        let challenge = state.code_challenge();
        if let Some(challenge) = challenge.as_deref() {
            params.push(("code_challenge", challenge));
            params.push(("code_challenge_method", "S256"));
        }

        let url = Url::parse_with_params(self.get_auth_url(), &params)
            .map_err(|e| AuthError::ConfigError(format!("Invalid authorization URL: {}", e)))?;
        Ok(url.into())
    }

    /// Form parameters for exchanging an authorization code.
    pub fn token_request_params(&self, code: &str, state: &OAuthState) -> Vec<(String, String)> {
        let mut params = vec![
            ("grant_type".to_string(), "authorization_code".to_string()),
            ("code".to_string(), code.to_string()),
            ("client_id".to_string(), self.client_id.clone()),
            ("client_secret".to_string(), self.client_secret.clone()),
            ("redirect_uri".to_string(), self.redirect_url.clone()),
        ];
        if let Some(verifier) = &state.code_verifier {
            params.push(("code_verifier".to_string(), verifier.clone()));
        }
        params
    }

    /// Form parameters for refreshing an access token.
    pub fn refresh_request_params(&self, refresh_token: &str) -> Vec<(String, String)> {
        vec![
            ("grant_type".to_string(), "refresh_token".to_string()),
            ("refresh_token".to_string(), refresh_token.to_string()),
            ("client_id".to_string(), self.client_id.clone()),
            ("client_secret".to_string(), self.client_secret.clone()),
        ]
    }
}

/// Token response from a calendar provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarTokens {
    /// Access token
    pub access_token: String,

    /// Token type (usually "Bearer")
    pub token_type: String,

    /// Expires in seconds
    pub expires_in: Option<i64>,

    /// Refresh token (if provided)
    pub refresh_token: Option<String>,

    /// Granted scopes
    pub scope: Option<String>,
}

impl CalendarTokens {
    /// Absolute expiry, given when the response was received.
    pub fn expires_at(&self, received_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in.map(|secs| received_at + Duration::seconds(secs))
    }
}

/// OAuth state stored between the redirect and the callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthState {
    /// Random state value
    pub state: String,

    /// Provider being connected
    pub provider: CalendarProvider,

    /// PKCE code verifier
    pub code_verifier: Option<String>,

    /// Page to return to after connecting
    pub redirect_after: Option<String>,

    /// Additional data to pass through
    #[serde(default)]
    pub extra: HashMap<String, String>,

    /// Created timestamp
    pub created_at: i64,
}

impl OAuthState {
    /// Create a new OAuth state.
    pub fn new(provider: CalendarProvider) -> Self {
        Self {
            state: random_alphanumeric(32),
            provider,
            code_verifier: None,
            redirect_after: None,
            extra: HashMap::new(),
            created_at: Utc::now().timestamp(),
        }
    }

    /// Create with a PKCE verifier.
    pub fn with_pkce(provider: CalendarProvider) -> Self {
        let mut state = Self::new(provider);
        state.code_verifier = Some(random_alphanumeric(64));
        state
    }

    /// Set the page to return to.
    pub fn with_redirect_after(mut self, path: impl Into<String>) -> Self {
        self.redirect_after = Some(path.into());
        self
    }

    /// Get the PKCE code challenge (S256, base64url without padding).
    pub fn code_challenge(&self) -> Option<String> {
        use sha2::{Digest, Sha256};

        self.code_verifier.as_ref().map(|verifier| {
            let mut hasher = Sha256::new();
            hasher.update(verifier.as_bytes());
            let hash = hasher.finalize();
            base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, hash)
        })
    }

    /// Check if the state has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() - self.created_at > STATE_TTL_SECS
    }

    /// Verify the state value returned to the callback.
    ///
    /// # Errors
    ///
    /// - `StateExpired` if the state is older than ten minutes
    /// - `StateMismatch` if the returned value differs
    pub fn verify(&self, returned: &str) -> AuthResult<()> {
        if self.is_expired() {
            return Err(AuthError::StateExpired);
        }
        if returned != self.state {
            return Err(AuthError::StateMismatch);
        }
        Ok(())
    }
}

fn random_alphanumeric(len: usize) -> String {
    use rand::Rng;

    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> CalendarOAuthConfig {
        CalendarOAuthConfig::new(
            CalendarProvider::Outlook,
            "client id",
            "client-secret",
            "http://localhost/calendar/callback",
        )
    }

    #[test]
    fn test_provider_parsing() {
        assert_eq!(CalendarProvider::parse("Google"), Some(CalendarProvider::Google));
        assert_eq!(CalendarProvider::parse("office365"), Some(CalendarProvider::Outlook));
        assert_eq!(CalendarProvider::parse("icloud"), None);
    }

    #[test]
    fn test_authorization_url_encodes_params() {
        let config = config();
        let state = OAuthState::new(CalendarProvider::Outlook);
        let url = Url::parse(&config.authorization_url(&state).unwrap()).unwrap();

        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["client_id"], "client id");
        assert_eq!(params["scope"], "offline_access Calendars.ReadWrite");
        assert_eq!(params["redirect_uri"], "http://localhost/calendar/callback");
        assert_eq!(params["state"], state.state);
        assert!(!params.contains_key("code_challenge"));
        assert!(!params.contains_key("access_type"));
    }

    #[test]
    fn test_google_requests_offline_access() {
        let config = CalendarOAuthConfig::new(CalendarProvider::Google, "id", "secret", "http://x/cb");
        let url = Url::parse(&config.authorization_url(&OAuthState::new(CalendarProvider::Google)).unwrap())
            .unwrap();
        let params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["prompt"], "consent");
    }

    #[test]
    fn test_pkce_challenge() {
        let mut state = OAuthState::with_pkce(CalendarProvider::Google);
        assert_eq!(state.code_verifier.as_ref().map(String::len), Some(64));

        // RFC 7636 appendix B test vector
        state.code_verifier = Some("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk".to_string());
        assert_eq!(
            state.code_challenge().as_deref(),
            Some("E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM")
        );
    }

    #[test]
    fn test_token_request_includes_verifier() {
        let config = config();
        let state = OAuthState::with_pkce(CalendarProvider::Outlook);
        let params = config.token_request_params("auth-code", &state);

        assert!(params.contains(&("code".to_string(), "auth-code".to_string())));
        assert!(params.iter().any(|(k, _)| k == "code_verifier"));
    }

    #[test]
    fn test_state_verification() {
        let state = OAuthState::new(CalendarProvider::Google);
        assert!(state.verify(&state.state.clone()).is_ok());
        assert!(matches!(state.verify("forged"), Err(AuthError::StateMismatch)));

        let mut stale = state.clone();
        stale.created_at -= STATE_TTL_SECS + 1;
        assert!(stale.is_expired());
        assert!(matches!(stale.verify(&stale.state.clone()), Err(AuthError::StateExpired)));
    }

    #[test]
    fn test_tokens_expiry() {
        let tokens = CalendarTokens {
            access_token: "a".into(),
            token_type: "Bearer".into(),
            expires_in: Some(3600),
            refresh_token: None,
            scope: None,
        };
        let now = Utc::now();
        assert_eq!(tokens.expires_at(now), Some(now + Duration::hours(1)));
    }
}
