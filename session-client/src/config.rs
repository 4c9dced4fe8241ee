use std::path::PathBuf;
use std::sync::Arc;

use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

use crate::storage::FileTokenStorage;
use crate::storage::MemoryTokenStorage;
use crate::storage::StorageKeys;
use crate::storage::TokenStorage;

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    /// Server base URL, without the `/trpc` suffix.
    pub api_url: String,
    /// JSON file holding the tokens; in-memory only when absent.
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
    #[serde(default)]
    pub storage_keys: StorageKeys,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            storage_path: None,
            storage_keys: StorageKeys::default(),
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SESSION_CLIENT_API_URL, SESSION_CLIENT_STORAGE_KEYS__ACCESS_TOKEN, ...)
    /// 2. config/session-client.toml
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let configuration = ConfigBuilder::builder()
            .set_default("api_url", "http://localhost:3000")?
            .add_source(File::with_name("config/session-client").required(false))
            .add_source(
                Environment::with_prefix("SESSION_CLIENT")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        configuration.try_deserialize()
    }

    /// Storage backend selected by `storage_path`.
    pub fn storage(&self) -> Arc<dyn TokenStorage> {
        match &self.storage_path {
            Some(path) => Arc::new(FileTokenStorage::new(path.clone())),
            None => Arc::new(MemoryTokenStorage::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    #[test]
    fn test_storage_keys_default_when_omitted() {
        let config: ClientConfig = ConfigBuilder::builder()
            .add_source(File::from_str(
                r#"api_url = "http://api.test""#,
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.api_url, "http://api.test");
        assert_eq!(config.storage_path, None);
        assert_eq!(config.storage_keys.access_token, "accessToken");
        assert_eq!(config.storage_keys.refresh_token, "refreshToken");
    }

    #[test]
    fn test_storage_keys_override() {
        let config: ClientConfig = ConfigBuilder::builder()
            .add_source(File::from_str(
                r#"
                api_url = "http://api.test"
                storage_path = "/tmp/session.json"

                [storage_keys]
                access_token = "at"
                refresh_token = "rt"
                "#,
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.storage_path, Some(PathBuf::from("/tmp/session.json")));
        assert_eq!(config.storage_keys.access_token, "at");
        assert_eq!(config.storage_keys.refresh_token, "rt");
    }
}
