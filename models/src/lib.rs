//! Wire types shared by the API server and its clients.
//!
//! Everything here serializes with camelCase field names. Request types carry
//! their own validation so both sides reject malformed input the same way.

pub mod auth;
pub mod envelope;
pub mod errors;
pub mod health;
pub mod user;

pub use auth::AuthResponse;
pub use auth::LoginRequest;
pub use auth::LogoutRequest;
pub use auth::RefreshRequest;
pub use auth::RegisterForm;
pub use auth::RegisterRequest;
pub use auth::TokenPair;
pub use envelope::ApiErrorData;
pub use envelope::ApiResponseBody;
pub use envelope::ErrorCode;
pub use errors::ValidationError;
pub use health::HealthResponse;
pub use health::HealthStatus;
pub use health::ServiceHealth;
pub use health::ServiceStatus;
pub use user::UserResponse;
