use std::sync::Arc;

use crate::clock::Clock;
use crate::jwt::Claims;
use crate::jwt::IssuedTokens;
use crate::jwt::JwtError;
use crate::jwt::TokenCodec;
use crate::jwt::TokenCodecConfig;
use crate::jwt::TokenSubject;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
///
/// Services hold one of these behind an `Arc` and call it from request
/// handlers; it has no interior mutability.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Errors
    /// * `JwtError` - Token secrets are empty or shared between classes
    pub fn new(
        password_hasher: PasswordHasher,
        tokens: &TokenCodecConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, JwtError> {
        Ok(Self {
            password_hasher,
            token_codec: TokenCodec::new(tokens, clock)?,
        })
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a token pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash could not be parsed
    /// * `JwtError` - Token signing failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &TokenSubject,
    ) -> Result<IssuedTokens, AuthenticationError> {
        if !self.password_hasher.verify(password, stored_hash)? {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.token_codec.sign_pair(subject)?)
    }

    /// Issue a token pair without password verification.
    ///
    /// Used right after registration and on refresh, where identity has
    /// already been established by other means.
    pub fn issue_tokens(&self, subject: &TokenSubject) -> Result<IssuedTokens, JwtError> {
        self.token_codec.sign_pair(subject)
    }

    pub fn verify_access_token(&self, token: &str) -> Option<Claims> {
        self.token_codec.verify_access_token(token)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Option<Claims> {
        self.token_codec.verify_refresh_token(token)
    }
}
