//! # Library Authentication
//!
//! Session tokens and calendar connections for the surgical technique
//! library.
//!
//! ## Overview
//!
//! The library-auth crate handles:
//! - **Session claims**: The backend-issued access token body
//! - **JWT**: Validation (and issuance, for tests and local development) of
//!   HMAC-signed access tokens
//! - **Calendar OAuth**: Authorization-code flow with PKCE for Google and
//!   Outlook calendars
//!
//! ## Features
//!
//! - `jwt` (default): Token encoding and validation using jsonwebtoken
//!
//! ## Usage
//!
//! ### Session Tokens
//!
//! ```rust
//! use library_auth::JwtService;
//! use uuid::Uuid;
//!
//! let service = JwtService::with_secret("local-development-secret-32-chars!").unwrap();
//!
//! let user_id = Uuid::now_v7();
//! let token = service.issue_access_token(user_id, "surgeon@example.com").unwrap();
//!
//! let claims = service.validate_token(&token).unwrap();
//! assert_eq!(claims.user_id(), Some(user_id));
//! ```
//!
//! ### Calendar OAuth
//!
//! ```rust,no_run
//! use library_auth::{CalendarOAuthConfig, CalendarProvider, OAuthState};
//!
//! let config = CalendarOAuthConfig::from_env(CalendarProvider::Google).unwrap();
//! let state = OAuthState::with_pkce(CalendarProvider::Google);
//! let redirect = config.authorization_url(&state).unwrap();
//! ```

pub mod calendar;
pub mod claims;
pub mod error;
#[cfg(feature = "jwt")]
pub mod jwt;

// Re-export main types
pub use calendar::{CalendarOAuthConfig, CalendarProvider, CalendarTokens, OAuthState};
pub use claims::{AppMetadata, SessionClaims, AUTHENTICATED_AUDIENCE};
pub use error::{AuthError, AuthResult};

#[cfg(feature = "jwt")]
pub use jwt::{JwtAlgorithm, JwtConfig, JwtService, TokenPair};
