//! Secret descriptor — the connection credential kept outside the configuration.

use std::fmt;
use std::path::Path;

use crate::error::SecretError;

/// Connection credential resolved from a secret file.
///
/// `Debug` never prints the URL since it usually embeds a password.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretDescriptor {
    url: String,
}

impl SecretDescriptor {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Extract the descriptor from an already parsed secret document.
    ///
    /// Only the top-level `url` key is required; every other key is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SecretError::MissingUrl`] when `url` is absent (or the
    /// document is not an object) and [`SecretError::UrlNotString`] when it
    /// is not a string.
    pub fn from_document(path: &Path, document: &serde_json::Value) -> Result<Self, SecretError> {
        match document.get("url") {
            Some(serde_json::Value::String(url)) => Ok(Self::new(url.as_str())),
            Some(_) => Err(SecretError::UrlNotString {
                path: path.to_path_buf(),
            }),
            None => Err(SecretError::MissingUrl {
                path: path.to_path_buf(),
            }),
        }
    }

    /// The connection string.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Debug for SecretDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDescriptor")
            .field("url", &"<redacted>")
            .finish()
    }
}
