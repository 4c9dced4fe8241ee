use std::sync::Arc;

use chrono::Duration;

use super::claims::Claims;
use super::claims::TokenSubject;
use super::errors::JwtError;
use super::handler::JwtHandler;
use super::handler::SignedToken;
use crate::clock::Clock;

/// Secrets and lifetimes for both token classes.
#[derive(Clone)]
pub struct TokenCodecConfig {
    pub access_secret: String,
    pub access_lifetime: Duration,
    pub refresh_secret: String,
    pub refresh_lifetime: Duration,
}

impl std::fmt::Debug for TokenCodecConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodecConfig")
            .field("access_secret", &"<redacted>")
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_secret", &"<redacted>")
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish()
    }
}

/// An access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Both tokens of a freshly signed pair, with their claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access: SignedToken,
    pub refresh: SignedToken,
}

impl IssuedTokens {
    pub fn pair(&self) -> TokenPair {
        TokenPair {
            access_token: self.access.token.clone(),
            refresh_token: self.refresh.token.clone(),
        }
    }

    pub fn into_pair(self) -> TokenPair {
        TokenPair {
            access_token: self.access.token,
            refresh_token: self.refresh.token,
        }
    }
}

/// Signs and verifies access and refresh tokens.
///
/// The two classes never share signing material, so an access token can not be
/// presented as a refresh token (and the other way round). Verification never
/// fails loudly: any bad signature, expiry or malformed input is a `None`.
pub struct TokenCodec {
    access: JwtHandler,
    refresh: JwtHandler,
}

impl TokenCodec {
    /// Build a codec from configuration.
    ///
    /// # Errors
    /// * `EmptySecret` - One of the secrets is empty
    /// * `SharedSecret` - Both classes were given the same secret
    pub fn new(config: &TokenCodecConfig, clock: Arc<dyn Clock>) -> Result<Self, JwtError> {
        if config.access_secret.is_empty() || config.refresh_secret.is_empty() {
            return Err(JwtError::EmptySecret);
        }
        if config.access_secret == config.refresh_secret {
            return Err(JwtError::SharedSecret);
        }

        Ok(Self {
            access: JwtHandler::new(
                config.access_secret.as_bytes(),
                config.access_lifetime,
                Arc::clone(&clock),
            ),
            refresh: JwtHandler::new(
                config.refresh_secret.as_bytes(),
                config.refresh_lifetime,
                clock,
            ),
        })
    }

    pub fn sign_access_token(&self, subject: &TokenSubject) -> Result<SignedToken, JwtError> {
        self.access.sign(subject)
    }

    pub fn sign_refresh_token(&self, subject: &TokenSubject) -> Result<SignedToken, JwtError> {
        self.refresh.sign(subject)
    }

    /// Sign an access token and a refresh token for the same subject.
    pub fn sign_pair(&self, subject: &TokenSubject) -> Result<IssuedTokens, JwtError> {
        Ok(IssuedTokens {
            access: self.sign_access_token(subject)?,
            refresh: self.sign_refresh_token(subject)?,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Option<Claims> {
        Self::verified("access", self.access.verify(token))
    }

    pub fn verify_refresh_token(&self, token: &str) -> Option<Claims> {
        Self::verified("refresh", self.refresh.verify(token))
    }

    fn verified(class: &'static str, result: Result<Claims, JwtError>) -> Option<Claims> {
        match result {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!(token_class = class, reason = %e, "Token rejected");
                None
            }
        }
    }
}
