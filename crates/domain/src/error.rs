//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`NeedleError`]
//! via `#[from]` or an explicit `From` impl. Transport failures coming from
//! adapters travel as boxed sources so the domain stays free of IO crates.

use std::path::PathBuf;

/// Boxed error used to carry adapter-specific failures across port boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error for every needlehub operation.
#[derive(Debug, thiserror::Error)]
pub enum NeedleError {
    /// The sensor configuration failed validation.
    #[error("invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// The secret descriptor could not be loaded.
    #[error("failed to load secret: {0}")]
    Secret(#[from] SecretError),

    /// Opening a connection to the document store failed.
    #[error("error connecting to client: {0}")]
    Connection(#[source] BoxError),

    /// The count query failed or returned an unusable result.
    #[error("query failed: {0}")]
    Query(#[from] QueryError),

    /// A reading did not have the expected shape.
    #[error("malformed reading: {0}")]
    MalformedReading(#[from] MalformedReading),

    /// The actuator rejected or failed to execute a move command.
    #[error("actuator command failed: {0}")]
    Actuator(#[source] BoxError),

    /// A sensor or actuator could not be resolved by name.
    #[error("failed to resolve resource: {0}")]
    Resolve(#[from] ResolveError),

    /// The sensor has been closed and no longer owns a connection.
    #[error("sensor is closed")]
    Closed,

    /// The operation exists in the host contract but is not implemented.
    #[error("operation `{0}` is not supported")]
    Unsupported(&'static str),
}

/// Sensor configuration validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("limit must be nonzero")]
    InvalidLimit,

    #[error("secret path must be specified")]
    MissingSecretPath,
}

/// Failures while resolving the secret descriptor from its file.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    /// The file could not be opened or read.
    #[error("failed to read secret file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file content is not valid structured data.
    #[error("malformed secret file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    /// The file parsed but has no `url` key.
    #[error("malformed secret file {}, key `url` not found", .path.display())]
    MissingUrl { path: PathBuf },

    /// The `url` key exists but is not a string.
    #[error("malformed secret file {}, key `url` must be a string", .path.display())]
    UrlNotString { path: PathBuf },
}

impl SecretError {
    /// `true` for failures of the file's content rather than of reading it.
    #[must_use]
    pub fn is_format(&self) -> bool {
        !matches!(self, Self::Read { .. })
    }

    /// The secret file this error refers to.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::MissingUrl { path }
            | Self::UrlNotString { path } => path,
        }
    }
}

/// Failures of the aggregate count query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The store rejected or failed the query.
    #[error("error running query: {0}")]
    Store(#[source] BoxError),

    /// The query succeeded but produced zero result rows.
    #[error("query returned no result rows")]
    EmptyResult,

    /// The result row has no usable `count` field.
    #[error("result row has no integer `count` field")]
    MissingCount,
}

/// Ways a reading can fail the controller's shape check.
#[derive(Debug, thiserror::Error)]
pub enum MalformedReading {
    /// `usage` is NaN or infinite.
    #[error("usage is not a finite number ({0})")]
    NonFiniteUsage(f64),

    /// A named field is absent or has the wrong type.
    #[error("field `{0}` is missing or has the wrong type")]
    Field(&'static str),

    /// The reading payload could not be decoded at all.
    #[error("reading payload could not be decoded")]
    Decode(#[source] BoxError),
}

/// Failures to look up a named sensor or actuator.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("resource `{name}` not found")]
    NotFound { name: String },

    #[error("resource `{name}` is unreachable: {source}")]
    Unreachable {
        name: String,
        #[source]
        source: BoxError,
    },
}
