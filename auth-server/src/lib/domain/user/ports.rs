use async_trait::async_trait;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// The user directory: where accounts live and how they are looked up.
///
/// Lookups only ever return live accounts; a soft-deleted user reads as
/// `None` so that refresh and identity resolution treat it as gone.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Insert a new account.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Another live account already uses the email
    /// * `DatabaseError` - Storage failure
    async fn create(&self, user: User) -> Result<User, UserError>;

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Exact, case-sensitive match on the stored address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;
}
