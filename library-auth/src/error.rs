//! Error types for authentication operations
//!
//! Covers session token validation and the calendar OAuth handshake.

use thiserror::Error;

/// Authentication error types.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Session token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Session token is invalid (malformed, bad signature, etc.)
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token is missing required claims
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    /// Caller is not signed in
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller lacks the required capability
    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    /// Calendar provider returned an error
    #[error("OAuth error: {0}")]
    OAuthError(String),

    /// OAuth callback state does not match the stored state
    #[error("OAuth state mismatch")]
    StateMismatch,

    /// OAuth state is older than its validity window
    #[error("OAuth state expired")]
    StateExpired,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type for authentication operations.
pub type AuthResult<T> = Result<T, AuthError>;

impl AuthError {
    /// Check if this error should be logged at error level.
    ///
    /// Expected failures (expired tokens, bad callbacks) are not server
    /// errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self, AuthError::Internal(_) | AuthError::ConfigError(_))
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::TokenExpired
            | AuthError::InvalidToken(_)
            | AuthError::MissingClaim(_)
            | AuthError::Unauthorized(_) => 401,

            AuthError::Forbidden => 403,

            AuthError::StateMismatch | AuthError::StateExpired => 400,

            AuthError::OAuthError(_) => 502,

            AuthError::ConfigError(_) | AuthError::Internal(_) => 500,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::TokenExpired => "TOKEN_EXPIRED",
            AuthError::InvalidToken(_) => "INVALID_TOKEN",
            AuthError::MissingClaim(_) => "MISSING_CLAIM",
            AuthError::Unauthorized(_) => "UNAUTHORIZED",
            AuthError::Forbidden => "FORBIDDEN",
            AuthError::OAuthError(_) => "OAUTH_ERROR",
            AuthError::StateMismatch => "STATE_MISMATCH",
            AuthError::StateExpired => "STATE_EXPIRED",
            AuthError::ConfigError(_) => "CONFIG_ERROR",
            AuthError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
