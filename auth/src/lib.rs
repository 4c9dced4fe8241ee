//! Authentication utilities library
//!
//! Provides the credential primitives used by the API server:
//! - Password hashing (Argon2id)
//! - Access and refresh token signing and verification (HS256, one secret per class)
//! - An `Authenticator` coordinating both
//! - A pluggable `Clock` so token expiry can be tested without sleeping
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).unwrap());
//! ```
//!
//! ## Token Pairs
//! ```
//! use std::sync::Arc;
//!
//! use auth::{SystemClock, TokenCodec, TokenCodecConfig, TokenSubject};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(
//!     &TokenCodecConfig {
//!         access_secret: "access_secret_at_least_32_bytes_long!".to_string(),
//!         access_lifetime: Duration::minutes(15),
//!         refresh_secret: "refresh_secret_at_least_32_bytes_long".to_string(),
//!         refresh_lifetime: Duration::days(7),
//!     },
//!     Arc::new(SystemClock),
//! )
//! .unwrap();
//!
//! let pair = codec
//!     .sign_pair(&TokenSubject::new("user123", "alice@example.com"))
//!     .unwrap()
//!     .into_pair();
//! let claims = codec.verify_access_token(&pair.access_token).unwrap();
//! assert_eq!(claims.email, "alice@example.com");
//! assert!(codec.verify_refresh_token(&pair.access_token).is_none());
//! ```

pub mod authenticator;
pub mod clock;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use jwt::Claims;
pub use jwt::IssuedTokens;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::SignedToken;
pub use jwt::TokenCodec;
pub use jwt::TokenCodecConfig;
pub use jwt::TokenPair;
pub use jwt::TokenSubject;
pub use password::HashCost;
pub use password::PasswordError;
pub use password::PasswordHasher;
