use async_trait::async_trait;
use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::TokenStoreError;
use crate::domain::auth::models::AuthSession;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::RefreshTokenRecord;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::user::models::User;

/// Port for authentication use cases.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Create an account and sign the caller in.
    ///
    /// # Arguments
    /// * `command` - Validated name, email and plain text password
    ///
    /// # Returns
    /// Token pair and the created user
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `PasswordHashing` - Hashing failed
    /// * `TokenSigning` - Token signing failed
    /// * `DatabaseError` - Database operation failed. When this comes from
    ///   recording the refresh token the account already exists and the
    ///   caller should log in rather than register again
    async fn register(&self, command: RegisterCommand) -> Result<AuthSession, AuthError>;

    /// Check credentials and issue a token pair.
    ///
    /// # Errors
    /// * `UserNotFound` - No live account with this email
    /// * `InvalidPassword` - Password does not match
    /// * `PasswordHashing` - Stored hash is unreadable
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, command: LoginCommand) -> Result<AuthSession, AuthError>;

    /// Trade a refresh token for a new pair.
    ///
    /// The presented token is spent only when the new pair is returned; any
    /// other outcome leaves it as it was.
    ///
    /// # Errors
    /// * `InvalidRefreshToken` - Signature, class or expiry check failed
    /// * `RefreshTokenRevoked` - Token already used or logged out
    /// * `UserNotFound` - Account no longer exists
    /// * `DatabaseError` - Database operation failed
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Revoke a refresh token. Unknown or invalid tokens are ignored.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn logout(&self, refresh_token: &str) -> Result<(), AuthError>;

    /// Resolve the user an access token belongs to.
    ///
    /// # Returns
    /// `None` for an invalid or expired token, or an account that is gone
    ///
    /// # Errors
    /// * `DatabaseError` - Directory lookup failed
    async fn resolve_user(&self, access_token: &str) -> Result<Option<User>, AuthError>;
}

/// Persistence for issued refresh tokens.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync + 'static {
    /// Record a newly issued refresh token.
    async fn store(&self, record: RefreshTokenRecord) -> Result<(), TokenStoreError>;

    /// Spend `jti` and record `replacement` in one atomic step.
    ///
    /// Nothing changes unless `jti` exists and has not expired at `now`.
    ///
    /// # Returns
    /// `true` if `jti` was spent and `replacement` stored
    async fn rotate(
        &self,
        jti: &Uuid,
        replacement: RefreshTokenRecord,
        now: DateTime<Utc>,
    ) -> Result<bool, TokenStoreError>;

    /// Delete a record if present.
    async fn revoke(&self, jti: &Uuid) -> Result<(), TokenStoreError>;

    /// Delete every record that expired at or before `now`.
    ///
    /// # Returns
    /// Number of records removed
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenStoreError>;
}
