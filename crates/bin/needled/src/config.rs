//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `needled.toml` in the working directory. Every field has a
//! default so the file is optional. Environment variables take precedence
//! over file values.

use std::path::Path;

use serde::Deserialize;

use needlehub_adapter_store_mongodb::MongoStoreConfig;
use needlehub_domain::config::SensorConfig;

/// Default location of the configuration file.
pub const CONFIG_FILE: &str = "needled.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// The hosted sensor.
    pub sensor: SensorSection,
    /// Document store settings.
    pub store: StoreConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Name and configuration blob of the hosted sensor.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorSection {
    /// Name the sensor is resolved by.
    pub name: String,
    /// Maximum number of documents. Zero is rejected when the sensor connects.
    pub limit: u64,
    /// Path of the JSON secret file holding the connection `url`.
    #[serde(alias = "secretPath")]
    pub secret_path: String,
}

/// Which [`DocumentStore`](needlehub_app::ports::DocumentStore) backs the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    Mongodb,
    Virtual,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mongodb" => Ok(Self::Mongodb),
            "virtual" => Ok(Self::Virtual),
            other => Err(ConfigError::Validation(format!(
                "unknown store backend `{other}`"
            ))),
        }
    }
}

/// Document store configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// `MongoDB` database holding the measured collection.
    pub database: String,
    /// Measured collection.
    pub collection: String,
    /// Document count reported by the virtual backend.
    pub virtual_count: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `needled.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if an
    /// override or the resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(Path::new(CONFIG_FILE))?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("NEEDLED_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Validation(format!("invalid NEEDLED_BIND `{val}`")))?;
        }
        if let Ok(val) = std::env::var("NEEDLED_LIMIT") {
            self.sensor.limit = val
                .parse()
                .map_err(|_| ConfigError::Validation(format!("invalid NEEDLED_LIMIT `{val}`")))?;
        }
        if let Ok(val) = std::env::var("NEEDLED_SECRET_PATH") {
            self.sensor.secret_path = val;
        }
        if let Ok(val) = std::env::var("NEEDLED_STORE") {
            self.store.backend = val.parse()?;
        }
        if let Ok(val) = std::env::var("NEEDLEHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.sensor.name.is_empty() {
            return Err(ConfigError::Validation(
                "sensor name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// The configuration blob handed to the sensor.
    #[must_use]
    pub fn sensor_config(&self) -> SensorConfig {
        SensorConfig::new(self.sensor.limit, self.sensor.secret_path.as_str())
    }

    #[must_use]
    pub fn mongo_config(&self) -> MongoStoreConfig {
        MongoStoreConfig {
            database: self.store.database.clone(),
            collection: self.store.collection.clone(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for SensorSection {
    fn default() -> Self {
        Self {
            name: "sensor-1".to_string(),
            limit: 0,
            secret_path: String::new(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        let mongo = MongoStoreConfig::default();
        Self {
            backend: StoreBackend::Mongodb,
            database: mongo.database,
            collection: mongo.collection,
            virtual_count: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "needled=info,needlehub=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
