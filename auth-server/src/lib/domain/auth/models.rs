use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserName;

/// Command to register a new account with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub name: UserName,
    pub email: EmailAddress,
    /// Plain text; hashed by the service
    pub password: String,
}

impl RegisterCommand {
    pub fn new(name: UserName, email: EmailAddress, password: String) -> Self {
        Self {
            name,
            email,
            password,
        }
    }
}

/// Command to log in with email and password
#[derive(Debug)]
pub struct LoginCommand {
    pub email: EmailAddress,
    pub password: String,
}

impl LoginCommand {
    pub fn new(email: EmailAddress, password: String) -> Self {
        Self { email, password }
    }
}

/// Outcome of a successful register or login.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub tokens: TokenPair,
    pub user: User,
}

/// Server-side record of an issued refresh token.
///
/// A refresh token is honoured only while its record exists. Refreshing swaps
/// it for the new token's record, logout deletes it, and the purger drops it
/// once expired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub jti: Uuid,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
