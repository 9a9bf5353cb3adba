//! Sensor configuration — the blob the host hands to construct and reconfigure.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NeedleError, ValidationError};

/// Configuration of a utilization sensor.
///
/// Missing fields deserialize to their zero value so that an absent `limit`
/// or `secret_path` is reported by [`validate`](Self::validate) rather than
/// by the decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Maximum number of documents the collection may hold.
    pub limit: u64,
    /// Path of the secret file holding the store connection string.
    #[serde(alias = "secretPath")]
    pub secret_path: String,
}

impl SensorConfig {
    #[must_use]
    pub fn new(limit: u64, secret_path: impl Into<String>) -> Self {
        Self {
            limit,
            secret_path: secret_path.into(),
        }
    }

    /// Check that both fields are set.
    ///
    /// The limit is checked first, so a zero limit is reported even when the
    /// secret path is also missing.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidLimit`] when `limit` is zero and
    /// [`ValidationError::MissingSecretPath`] when `secret_path` is empty.
    pub fn validate(&self) -> Result<(), NeedleError> {
        if self.limit == 0 {
            return Err(ValidationError::InvalidLimit.into());
        }
        if self.secret_path.is_empty() {
            return Err(ValidationError::MissingSecretPath.into());
        }
        Ok(())
    }

    #[must_use]
    pub fn secret_path(&self) -> &Path {
        Path::new(&self.secret_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_valid_config() {
        let config = SensorConfig::new(100, "/etc/needlehub/secret.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_reject_zero_limit() {
        let config = SensorConfig::new(0, "/etc/needlehub/secret.json");
        assert!(matches!(
            config.validate(),
            Err(NeedleError::Validation(ValidationError::InvalidLimit))
        ));
    }

    #[test]
    fn should_report_zero_limit_before_missing_path() {
        let config = SensorConfig::new(0, "");
        assert!(matches!(
            config.validate(),
            Err(NeedleError::Validation(ValidationError::InvalidLimit))
        ));
    }

    #[test]
    fn should_reject_empty_secret_path() {
        let config = SensorConfig::new(10, "");
        assert!(matches!(
            config.validate(),
            Err(NeedleError::Validation(ValidationError::MissingSecretPath))
        ));
    }

    #[test]
    fn should_default_missing_fields_so_validation_catches_them() {
        let config: SensorConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SensorConfig::default());
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_camel_case_secret_path() {
        let config: SensorConfig =
            serde_json::from_str(r#"{"limit": 5, "secretPath": "/tmp/s.json"}"#).unwrap();
        assert_eq!(config.limit, 5);
        assert_eq!(config.secret_path, "/tmp/s.json");
    }

    #[test]
    fn should_reject_negative_limit_when_decoding() {
        let result = serde_json::from_str::<SensorConfig>(r#"{"limit": -1}"#);
        assert!(result.is_err());
    }
}
