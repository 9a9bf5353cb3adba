//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `needle-controller.toml` in the working directory. Every field
//! has a default so the file is optional.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use needlehub_app::feedback_controller::ControllerSettings;
use needlehub_domain::command::DEFAULT_MAX_ANGLE;

/// Default location of the configuration file.
pub const CONFIG_FILE: &str = "needle-controller.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Loop settings.
    pub controller: ControllerConfig,
    /// Where the sensor is hosted.
    pub sensor: SensorConfig,
    /// The servo driving the needle.
    pub actuator: ActuatorConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Seconds between the starts of two cycles.
    pub interval_secs: u64,
    /// Full-scale deflection used by the usage → angle mapping.
    pub max_angle: u32,
    pub sensor_name: String,
    pub actuator_name: String,
}

/// Remote sensor host.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Base URL of the `needled` instance hosting the sensor.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Virtual servo range.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Largest angle the servo accepts. Commands outside `0..=max_angle` fail.
    pub max_angle: u32,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `needle-controller.toml` (if present) then
    /// apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
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
        if let Ok(val) = std::env::var("NEEDLE_CONTROLLER_SENSOR_URL") {
            self.sensor.base_url = val;
        }
        if let Ok(val) = std::env::var("NEEDLE_CONTROLLER_INTERVAL_SECS") {
            self.controller.interval_secs = val.parse().map_err(|_| {
                ConfigError::Validation(format!("invalid NEEDLE_CONTROLLER_INTERVAL_SECS `{val}`"))
            })?;
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
        if self.controller.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "interval must be non-zero".to_string(),
            ));
        }
        if self.controller.max_angle == 0 {
            return Err(ConfigError::Validation(
                "max angle must be non-zero".to_string(),
            ));
        }
        if self.sensor.base_url.is_empty() {
            return Err(ConfigError::Validation(
                "sensor base url must be specified".to_string(),
            ));
        }
        Ok(())
    }

    /// Settings for the feedback loop.
    #[must_use]
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings {
            interval: Duration::from_secs(self.controller.interval_secs),
            max_angle: self.controller.max_angle,
            sensor_name: self.controller.sensor_name.clone(),
            actuator_name: self.controller.actuator_name.clone(),
        }
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.sensor.timeout_secs)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let settings = ControllerSettings::default();
        Self {
            interval_secs: settings.interval.as_secs(),
            max_angle: settings.max_angle,
            sensor_name: settings.sensor_name,
            actuator_name: settings.actuator_name,
        }
    }
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            max_angle: DEFAULT_MAX_ANGLE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "needle_controller=info,needlehub=info".to_string(),
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
