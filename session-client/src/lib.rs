//! Client-side session handling for the auth API.
//!
//! Keeps the access/refresh pair in durable storage, attaches the access token
//! to protected calls and renews it once when the server answers 401.

pub mod client;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod storage;
pub mod store;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use coordinator::RefreshCoordinator;
pub use coordinator::RefreshState;
pub use errors::ClientError;
pub use errors::StorageError;
pub use storage::FileTokenStorage;
pub use storage::MemoryTokenStorage;
pub use storage::StorageKeys;
pub use storage::TokenStorage;
pub use store::AuthState;
pub use store::SessionStore;
