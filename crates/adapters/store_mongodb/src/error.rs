//! Store-specific error type wrapping driver errors.

use needlehub_domain::error::{NeedleError, QueryError};

/// Errors originating from the `MongoDB` layer.
#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    /// The client could not be created from the connection string.
    #[error("invalid connection string: {0}")]
    Client(#[source] mongodb::error::Error),

    /// The server did not answer the initial `ping`.
    #[error("server did not answer ping: {0}")]
    Ping(#[source] mongodb::error::Error),

    /// The aggregation failed or its cursor could not be read.
    #[error("aggregation failed: {0}")]
    Aggregate(#[source] mongodb::error::Error),
}

impl MongoError {
    #[must_use]
    pub fn into_domain(self) -> NeedleError {
        match self {
            Self::Client(_) | Self::Ping(_) => NeedleError::Connection(Box::new(self)),
            Self::Aggregate(_) => NeedleError::Query(QueryError::Store(Box::new(self))),
        }
    }
}

impl From<MongoError> for NeedleError {
    fn from(err: MongoError) -> Self {
        err.into_domain()
    }
}
