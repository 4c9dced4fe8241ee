use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Identity carried by every token: who the user is and the email they signed in with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: String,
    pub email: String,
}

impl TokenSubject {
    pub fn new(user_id: impl ToString, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.to_string(),
            email: email.into(),
        }
    }
}

/// Claims encoded in access and refresh tokens.
///
/// Both token classes share this shape; only the signing secret and the
/// lifetime differ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User identifier
    #[serde(rename = "userId")]
    pub user_id: String,

    /// Email the user authenticated with
    pub email: String,

    /// Unique token identifier
    pub jti: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Build claims for `subject`, valid from `issued_at` for `lifetime`.
    pub fn issue(subject: &TokenSubject, issued_at: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            user_id: subject.user_id.clone(),
            email: subject.email.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + lifetime).timestamp(),
        }
    }

    pub fn subject(&self) -> TokenSubject {
        TokenSubject {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
        }
    }

    /// A token is expired from the second its `exp` is reached.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp <= current_timestamp
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
