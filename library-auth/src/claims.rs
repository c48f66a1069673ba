//! Session token claims
//!
//! Access tokens are issued by the backend's auth service. Besides the
//! standard registered claims they carry the session id and two metadata
//! maps: `app_metadata` is server-controlled, `user_metadata` is editable by
//! the user and must never be trusted for authorization.

use chrono::{DateTime, Duration, Utc};
use library_rbac::Role;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Audience of tokens issued to signed-in users.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// Claims of a backend-issued access token.
///
/// # Example
///
/// ```rust
/// use chrono::Duration;
/// use library_auth::claims::SessionClaims;
/// use uuid::Uuid;
///
/// let claims = SessionClaims::new(Uuid::now_v7(), "surgeon@example.com", Duration::hours(1));
/// assert!(claims.is_authenticated());
/// assert!(!claims.is_expired());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    // Standard JWT claims (RFC 7519)
    /// Subject (auth user ID)
    pub sub: String,

    /// Issuer
    #[serde(default)]
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    // Backend-specific claims
    /// User email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Database role the token maps to (`authenticated` or `anon`)
    pub role: String,

    /// Session ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Server-controlled metadata
    #[serde(default)]
    pub app_metadata: AppMetadata,

    /// User-controlled metadata
    #[serde(default)]
    pub user_metadata: HashMap<String, serde_json::Value>,
}

impl SessionClaims {
    /// Create claims for a signed-in user.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The auth user ID
    /// * `email` - The user's email address
    /// * `duration` - Token validity duration
    pub fn new(user_id: Uuid, email: impl Into<String>, duration: Duration) -> Self {
        let now = Utc::now();
        let exp = now + duration;

        Self {
            sub: user_id.to_string(),
            iss: String::new(),
            aud: AUTHENTICATED_AUDIENCE.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            email: Some(email.into()),
            role: AUTHENTICATED_AUDIENCE.to_string(),
            session_id: Some(Uuid::now_v7().to_string()),
            app_metadata: AppMetadata::default(),
            user_metadata: HashMap::new(),
        }
    }

    /// Get the user ID as UUID.
    pub fn user_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.sub).ok()
    }

    /// Check if the token belongs to a signed-in user.
    pub fn is_authenticated(&self) -> bool {
        self.role == AUTHENTICATED_AUDIENCE
    }

    /// Check if the token is expired.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Check if the token expires within `window`, so it should be refreshed.
    pub fn expires_within(&self, window: Duration) -> bool {
        (Utc::now() + window).timestamp() >= self.exp
    }

    /// Get expiration as DateTime.
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }

    /// Library role from server-controlled metadata.
    ///
    /// Missing or unknown values yield [`Role::User`]. The profile row stays
    /// the source of truth; this is only a hint for routing before the
    /// profile loads.
    pub fn library_role(&self) -> Role {
        self.app_metadata
            .library_role
            .as_deref()
            .and_then(Role::parse)
            .unwrap_or_default()
    }

    /// Set the issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.iss = issuer.into();
        self
    }

    /// Set the sign-in provider.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        let provider = provider.into();
        if !self.app_metadata.providers.contains(&provider) {
            self.app_metadata.providers.push(provider.clone());
        }
        self.app_metadata.provider = Some(provider);
        self
    }

    /// Set the library role hint.
    pub fn with_library_role(mut self, role: Role) -> Self {
        self.app_metadata.library_role = Some(role.as_str().to_string());
        self
    }
}

/// Server-controlled token metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppMetadata {
    /// Provider used for this sign-in (e.g. "email", "google")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// Every provider linked to the account
    #[serde(default)]
    pub providers: Vec<String>,

    /// Library role hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_role: Option<String>,
}
