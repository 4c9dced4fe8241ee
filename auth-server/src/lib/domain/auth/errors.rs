use thiserror::Error;

use crate::user::errors::UserError;

/// Coarse classification the transport layer maps onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Conflict,
    NotFound,
    Unauthorized,
    Validation,
    Internal,
}

/// Error for refresh token bookkeeping
#[derive(Debug, Clone, Error)]
pub enum TokenStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Top-level error for register, login, refresh and logout.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Email already exists: {0}")]
    EmailAlreadyExists(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidPassword,

    #[error("Session expired")]
    InvalidRefreshToken,

    #[error("Session expired")]
    RefreshTokenRevoked,

    #[error("Password hashing failed: {0}")]
    PasswordHashing(String),

    #[error("Token signing failed: {0}")]
    TokenSigning(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AuthError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        AuthError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation { .. } => ErrorKind::Validation,
            AuthError::EmailAlreadyExists(_) => ErrorKind::Conflict,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::InvalidPassword
            | AuthError::InvalidRefreshToken
            | AuthError::RefreshTokenRevoked => ErrorKind::Unauthorized,
            AuthError::PasswordHashing(_)
            | AuthError::TokenSigning(_)
            | AuthError::DatabaseError(_)
            | AuthError::Unknown(_) => ErrorKind::Internal,
        }
    }

    /// Request field the error refers to, when there is one.
    pub fn field(&self) -> Option<&str> {
        match self {
            AuthError::Validation { field, .. } => Some(field),
            AuthError::EmailAlreadyExists(_) => Some("email"),
            _ => None,
        }
    }
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::EmailAlreadyExists(email) => AuthError::EmailAlreadyExists(email),
            UserError::InvalidName(e) => AuthError::validation("name", e.to_string()),
            UserError::InvalidEmail(e) => AuthError::validation("email", e.to_string()),
            // A stored row that no longer parses is a storage fault, not a client one
            UserError::InvalidUserId(e) => AuthError::DatabaseError(e.to_string()),
            UserError::DatabaseError(e) => AuthError::DatabaseError(e),
        }
    }
}

impl From<TokenStoreError> for AuthError {
    fn from(err: TokenStoreError) -> Self {
        match err {
            TokenStoreError::DatabaseError(e) => AuthError::DatabaseError(e),
        }
    }
}

impl From<models::ValidationError> for AuthError {
    fn from(err: models::ValidationError) -> Self {
        AuthError::Validation {
            field: err.field,
            message: err.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_email_is_conflict_on_email_field() {
        let err = AuthError::from(UserError::EmailAlreadyExists("alice@x.com".to_string()));

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.field(), Some("email"));
    }

    #[test]
    fn test_refresh_failures_share_a_generic_message() {
        assert_eq!(AuthError::InvalidRefreshToken.to_string(), "Session expired");
        assert_eq!(AuthError::RefreshTokenRevoked.to_string(), "Session expired");
        assert_eq!(
            AuthError::RefreshTokenRevoked.kind(),
            ErrorKind::Unauthorized
        );
    }

    #[test]
    fn test_database_failure_is_internal() {
        let err = AuthError::from(UserError::DatabaseError("connection reset".to_string()));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.field(), None);
    }
}
