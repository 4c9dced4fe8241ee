use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::TokenSubject;
use super::errors::JwtError;
use crate::clock::Clock;

/// An encoded token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    pub token: String,
    pub claims: Claims,
}

/// Signs and verifies one class of token.
///
/// Uses HS256 (HMAC with SHA-256). Each handler owns its secret and token
/// lifetime; expiry is checked against the injected clock rather than the
/// system time so that tests can move time forward.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    lifetime: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtHandler {
    /// Create a new handler.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (at least 32 bytes recommended)
    /// * `lifetime` - How long issued tokens stay valid
    /// * `clock` - Time source for `iat`/`exp` and expiry checks
    pub fn new(secret: &[u8], lifetime: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            lifetime,
            clock,
        }
    }

    /// Sign a fresh token for `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn sign(&self, subject: &TokenSubject) -> Result<SignedToken, JwtError> {
        let claims = Claims::issue(subject, self.clock.now(), self.lifetime);
        let token = self.encode(&claims)?;
        Ok(SignedToken { token, claims })
    }

    /// Encode already-built claims.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode a token, checking signature, algorithm and expiry.
    ///
    /// # Errors
    /// * `DecodingFailed` - Signature mismatch, wrong algorithm or malformed token
    /// * `TokenExpired` - The clock has reached the token's `exp`
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked below against the injected clock
        validation.validate_exp = false;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| JwtError::DecodingFailed(e.to_string()))?;

        let claims = token_data.claims;
        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(JwtError::TokenExpired);
        }

        Ok(claims)
    }
}
