use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::TokenStorage;
use crate::errors::StorageError;

/// Tokens kept in a flat JSON object on disk.
///
/// Writes go to a sibling temp file which is then renamed over the target,
/// so a crash never leaves a half-written file behind.
pub struct FileTokenStorage {
    path: PathBuf,
    // Serialises read-modify-write cycles
    lock: Mutex<()>,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    async fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let payload = serde_json::to_vec_pretty(entries)?;
        let temp_path = self
            .path
            .with_extension(format!("{}.tmp", uuid::Uuid::new_v4().simple()));

        tokio::fs::write(&temp_path, payload).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn write(&self, entries: &[(&str, Option<&str>)]) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut stored = self.read_all().await?;

        for (key, value) in entries {
            match value {
                Some(value) => stored.insert(key.to_string(), value.to_string()),
                None => stored.remove(*key),
            };
        }

        self.write_all(&stored).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileTokenStorage::new(dir.path().join("session.json"));

        assert_eq!(storage.get("accessToken").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_write_then_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let storage = FileTokenStorage::new(&path);
        storage
            .write(&[("accessToken", Some("a1")), ("refreshToken", Some("r1"))])
            .await
            .unwrap();
        storage.write(&[("accessToken", None)]).await.unwrap();

        let reopened = FileTokenStorage::new(&path);
        assert_eq!(reopened.get("accessToken").await.unwrap(), None);
        assert_eq!(
            reopened.get("refreshToken").await.unwrap(),
            Some("r1".to_string())
        );

        // Only the target file is left, no temp files
        let files: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();

        let storage = FileTokenStorage::new(&path);
        assert!(matches!(
            storage.get("accessToken").await,
            Err(StorageError::Serialization(_))
        ));
    }
}
