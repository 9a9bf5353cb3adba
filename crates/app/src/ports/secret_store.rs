//! Secret store port — resolves the secret descriptor named by the configuration.

use std::future::Future;
use std::path::Path;

use needlehub_domain::error::SecretError;
use needlehub_domain::secret::SecretDescriptor;

/// Loads a [`SecretDescriptor`] from wherever secrets live (usually a file).
pub trait SecretStore: Send + Sync {
    /// Load and parse the secret at `path`.
    ///
    /// Implementations must keep read failures ([`SecretError::Read`]) apart
    /// from content failures so callers can tell them apart.
    fn load(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<SecretDescriptor, SecretError>> + Send;
}
