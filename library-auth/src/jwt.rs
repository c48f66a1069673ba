//! Session token encoding and validation
//!
//! The backend signs access tokens with a shared HMAC secret. This module
//! validates them (and issues them, for tests and local development) using
//! the jsonwebtoken crate.

use crate::claims::{SessionClaims, AUTHENTICATED_AUDIENCE};
use crate::error::{AuthError, AuthResult};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};

/// JWT configuration for token validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared HMAC secret
    pub secret: String,

    /// Algorithm to use
    pub algorithm: JwtAlgorithm,

    /// Expected issuer (not checked when empty)
    pub issuer: String,

    /// Expected audience
    pub audience: String,

    /// Access token duration
    pub access_token_duration: Duration,

    /// Allowed clock skew in seconds
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            algorithm: JwtAlgorithm::HS256,
            issuer: String::new(),
            audience: AUTHENTICATED_AUDIENCE.to_string(),
            access_token_duration: Duration::hours(1),
            leeway_secs: 30,
        }
    }
}

impl JwtConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `LIBRARY_JWT_SECRET`: HMAC secret (required)
    /// - `LIBRARY_JWT_ISSUER`: expected issuer, e.g. `https://<project>/auth/v1`
    /// - `LIBRARY_JWT_EXPIRY_SECS`: access token lifetime (default: 3600)
    pub fn from_env() -> AuthResult<Self> {
        let default = Self::default();
        let secret = std::env::var("LIBRARY_JWT_SECRET")
            .map_err(|_| AuthError::ConfigError("LIBRARY_JWT_SECRET is not set".to_string()))?;

        Ok(Self {
            secret,
            issuer: std::env::var("LIBRARY_JWT_ISSUER").unwrap_or(default.issuer),
            access_token_duration: std::env::var("LIBRARY_JWT_EXPIRY_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::seconds)
                .unwrap_or(default.access_token_duration),
            ..default
        })
    }
}

/// Supported JWT algorithms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum JwtAlgorithm {
    /// HMAC using SHA-256
    HS256,
    /// HMAC using SHA-384
    HS384,
    /// HMAC using SHA-512
    HS512,
}

impl From<JwtAlgorithm> for Algorithm {
    fn from(alg: JwtAlgorithm) -> Self {
        match alg {
            JwtAlgorithm::HS256 => Algorithm::HS256,
            JwtAlgorithm::HS384 => Algorithm::HS384,
            JwtAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

/// JWT service for session tokens.
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &self.config.algorithm)
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

impl JwtService {
    /// Create a new JWT service with the given configuration.
    ///
    /// # Errors
    ///
    /// `ConfigError` if the secret is empty
    pub fn new(config: JwtConfig) -> AuthResult<Self> {
        if config.secret.is_empty() {
            return Err(AuthError::ConfigError("Secret required for HMAC".to_string()));
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
        })
    }

    /// Create with a simple secret (HS256).
    pub fn with_secret(secret: impl Into<String>) -> AuthResult<Self> {
        Self::new(JwtConfig {
            secret: secret.into(),
            ..Default::default()
        })
    }

    /// Issue an access token for a user.
    pub fn issue_access_token(&self, user_id: Uuid, email: impl Into<String>) -> AuthResult<String> {
        let claims = SessionClaims::new(user_id, email, self.config.access_token_duration)
            .with_issuer(self.config.issuer.clone());
        self.encode_claims(&claims)
    }

    /// Issue an access token together with an opaque refresh token.
    pub fn issue_pair(&self, user_id: Uuid, email: impl Into<String>) -> AuthResult<TokenPair> {
        use rand::Rng;

        let access_token = self.issue_access_token(user_id, email)?;
        let refresh_token: String = rand::thread_rng()
            .sample_iter(&rand::distributions::Alphanumeric)
            .take(40)
            .map(char::from)
            .collect();

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_duration.num_seconds(),
        ))
    }

    /// Encode existing claims.
    pub fn encode_claims(&self, claims: &SessionClaims) -> AuthResult<String> {
        let header = Header::new(self.config.algorithm.into());
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Validate and decode a token.
    ///
    /// # Errors
    ///
    /// - `TokenExpired` past `exp` (plus leeway)
    /// - `InvalidToken` for malformed tokens, bad signatures, or a wrong
    ///   issuer or audience
    /// - `Unauthorized` for valid tokens not belonging to a signed-in user
    pub fn validate_token(&self, token: &str) -> AuthResult<SessionClaims> {
        let mut validation = Validation::new(self.config.algorithm.into());
        validation.leeway = self.config.leeway_secs;
        validation.set_audience(&[&self.config.audience]);
        if !self.config.issuer.is_empty() {
            validation.set_issuer(&[&self.config.issuer]);
        }

        let token_data: TokenData<SessionClaims> = decode(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    AuthError::InvalidToken("Malformed token".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AuthError::InvalidToken("Invalid signature".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => {
                    AuthError::InvalidToken("Invalid issuer".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidAudience => {
                    AuthError::InvalidToken("Invalid audience".to_string())
                }
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        let claims = token_data.claims;
        if !claims.is_authenticated() {
            return Err(AuthError::Unauthorized(format!(
                "token role '{}' is not a signed-in user",
                claims.role
            )));
        }
        if claims.user_id().is_none() {
            return Err(AuthError::MissingClaim("sub".to_string()));
        }

        Ok(claims)
    }

    /// Get the configuration.
    pub fn config(&self) -> &JwtConfig {
        &self.config
    }
}

/// Token pair containing access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    /// Access token (short-lived)
    pub access_token: String,

    /// Refresh token (opaque, long-lived)
    pub refresh_token: String,

    /// Token type (always "Bearer")
    pub token_type: String,

    /// Access token expiration in seconds
    pub expires_in: i64,
}

impl TokenPair {
    /// Create a new token pair.
    pub fn new(access_token: String, refresh_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
        }
    }
}
