use std::env;
use std::time::Duration;

use auth::TokenCodecConfig;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub cache: CacheConfig,
    pub refresh_tokens: RefreshTokenConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
    /// Allowed browser origin, or `*` for any.
    pub cors_origin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub access: TokenConfig,
    pub refresh: TokenConfig,
}

#[derive(Deserialize, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub expiration_seconds: i64,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("expiration_seconds", &self.expiration_seconds)
            .finish()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub ttl_seconds: u64,
    pub sweep_interval_seconds: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RefreshTokenConfig {
    /// How often expired refresh token records are deleted.
    pub purge_interval_seconds: u64,
}

impl RefreshTokenConfig {
    pub fn purge_interval(&self) -> Duration {
        Duration::from_secs(self.purge_interval_seconds)
    }
}

impl JwtConfig {
    /// Secrets and lifetimes in the shape the token codec expects.
    pub fn token_codec_config(&self) -> TokenCodecConfig {
        TokenCodecConfig {
            access_secret: self.access.secret.clone(),
            access_lifetime: chrono::Duration::seconds(self.access.expiration_seconds),
            refresh_secret: self.refresh.secret.clone(),
            refresh_lifetime: chrono::Duration::seconds(self.refresh.expiration_seconds),
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__ACCESS__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: JWT__ACCESS__SECRET=... overrides jwt.access.secret
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    const DEFAULTS: &str = include_str!("../../config/default.toml");

    #[test]
    fn test_default_file_deserializes() {
        let config: Config = ConfigBuilder::builder()
            .add_source(File::from_str(DEFAULTS, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.cache.sweep_interval(), Duration::from_secs(300));
        assert_eq!(
            config.refresh_tokens.purge_interval(),
            Duration::from_secs(3600)
        );
        assert_eq!(config.database.max_connections, 5);
        assert_ne!(config.jwt.access.secret, config.jwt.refresh.secret);
    }

    #[test]
    fn test_token_codec_config_uses_seconds() {
        let jwt = JwtConfig {
            access: TokenConfig {
                secret: "a".to_string(),
                expiration_seconds: 900,
            },
            refresh: TokenConfig {
                secret: "b".to_string(),
                expiration_seconds: 86_400,
            },
        };

        let codec = jwt.token_codec_config();
        assert_eq!(codec.access_lifetime, chrono::Duration::minutes(15));
        assert_eq!(codec.refresh_lifetime, chrono::Duration::days(1));
        assert!(!format!("{:?}", jwt).contains("secret: \"a\""));
    }
}
