use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::StorageError;

mod file;
mod memory;

pub use file::FileTokenStorage;
pub use memory::MemoryTokenStorage;

/// Names the two tokens are stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    pub access_token: String,
    pub refresh_token: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            access_token: "accessToken".to_string(),
            refresh_token: "refreshToken".to_string(),
        }
    }
}

/// Durable string key/value storage for session tokens.
#[async_trait]
pub trait TokenStorage: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Apply a batch of writes at once; `None` removes the key.
    async fn write(&self, entries: &[(&str, Option<&str>)]) -> Result<(), StorageError>;
}
