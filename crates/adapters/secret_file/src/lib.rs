//! # needlehub-adapter-secret-file
//!
//! Reads the sensor's connection secret from a JSON file.
//!
//! ## Responsibilities
//! - Implement the `SecretStore` port defined in `needlehub-app::ports`
//! - Keep IO failures (`SecretError::Read`) apart from format failures
//!   (`Parse`, `MissingUrl`, `UrlNotString`)
//!
//! The file is read again on every `load`, so a rotated secret is picked up
//! by the next reconfiguration without restarting the process.
//!
//! ## Dependency rule
//! Depends on `needlehub-app` (for port traits) and `needlehub-domain` (for domain types).

use std::path::Path;

use needlehub_app::ports::SecretStore;
use needlehub_domain::error::SecretError;
use needlehub_domain::secret::SecretDescriptor;

/// Loads secrets from JSON documents of the form `{"url": "..."}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSecretFile;

impl JsonSecretFile {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SecretStore for JsonSecretFile {
    #[tracing::instrument(skip(self))]
    async fn load(&self, path: &Path) -> Result<SecretDescriptor, SecretError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| SecretError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|source| SecretError::Parse {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;
        let secret = SecretDescriptor::from_document(path, &document)?;
        tracing::debug!("secret loaded");
        Ok(secret)
    }
}
