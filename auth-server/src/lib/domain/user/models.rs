use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::user::errors::EmailError;
use crate::user::errors::UserIdError;
use crate::user::errors::UserNameError;

/// Storage width shared by `name` and `email`.
const MAX_FIELD_LENGTH: usize = 255;

/// User aggregate entity.
///
/// A row with `deleted_at` set is a soft-deleted account; the directory never
/// hands those out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: UserName,
    pub email: EmailAddress,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build a fresh, never-updated account.
    pub fn new(
        name: UserName,
        email: EmailAddress,
        password_hash: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            name,
            email,
            password_hash,
            created_at,
            updated_at: None,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Arguments
    /// * `s` - UUID string to parse
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Display name value type
///
/// Non-blank and at most 255 characters. Any characters are allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserName(String);

impl UserName {
    /// Create a new valid name.
    ///
    /// # Errors
    /// * `Blank` - Name is empty or whitespace only
    /// * `TooLong` - Name longer than 255 characters
    pub fn new(name: String) -> Result<Self, UserNameError> {
        if name.trim().is_empty() {
            return Err(UserNameError::Blank);
        }

        let length = name.chars().count();
        if length > MAX_FIELD_LENGTH {
            return Err(UserNameError::TooLong {
                max: MAX_FIELD_LENGTH,
                actual: length,
            });
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Arguments
    /// * `email` - Raw email string
    ///
    /// # Returns
    /// Validated EmailAddress value object
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    /// * `TooLong` - Email longer than 255 bytes
    pub fn new(email: String) -> Result<Self, EmailError> {
        if email.len() > MAX_FIELD_LENGTH {
            return Err(EmailError::TooLong {
                max: MAX_FIELD_LENGTH,
                actual: email.len(),
            });
        }

        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    /// Get email as string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_name_accepts_any_characters() {
        assert!(UserName::new("Zoë O'Brien".to_string()).is_ok());
    }

    #[test]
    fn test_user_name_rejects_blank() {
        assert_eq!(UserName::new("  ".to_string()), Err(UserNameError::Blank));
    }

    #[test]
    fn test_user_name_rejects_too_long() {
        let result = UserName::new("a".repeat(256));
        assert_eq!(
            result,
            Err(UserNameError::TooLong {
                max: 255,
                actual: 256
            })
        );
    }

    #[test]
    fn test_email_validation() {
        assert!(EmailAddress::new("alice@x.com".to_string()).is_ok());
        assert!(matches!(
            EmailAddress::new("alice".to_string()),
            Err(EmailError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_user_id_round_trip() {
        let id = UserId::new();
        assert_eq!(UserId::from_string(&id.to_string()), Ok(id));
        assert!(UserId::from_string("nope").is_err());
    }
}
