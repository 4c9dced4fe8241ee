use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::TokenStorage;
use crate::errors::StorageError;

/// Storage that lives as long as the process.
#[derive(Default)]
pub struct MemoryTokenStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn write(&self, entries: &[(&str, Option<&str>)]) -> Result<(), StorageError> {
        let mut stored = self.entries.write().await;
        for (key, value) in entries {
            match value {
                Some(value) => stored.insert(key.to_string(), value.to_string()),
                None => stored.remove(*key),
            };
        }
        Ok(())
    }
}
