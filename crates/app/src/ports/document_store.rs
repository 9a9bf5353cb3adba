//! Document store port — the opaque external collection being measured.

use std::future::Future;

use needlehub_domain::error::NeedleError;
use needlehub_domain::reading::CountRow;
use needlehub_domain::secret::SecretDescriptor;

/// Opens connections to the store holding the measured collection.
pub trait DocumentStore: Send + Sync {
    type Connection: StoreConnection;

    /// Open a connection using the credential from `secret`.
    ///
    /// Transport failures must be reported as [`NeedleError::Connection`].
    fn connect(
        &self,
        secret: &SecretDescriptor,
    ) -> impl Future<Output = Result<Self::Connection, NeedleError>> + Send;
}

/// A live connection, exclusively owned by one sensor.
pub trait StoreConnection: Send + Sync + 'static {
    /// Run the aggregate "count all documents" query once.
    ///
    /// Returns every result row; an empty vector means the query produced no
    /// row at all, which is different from one row with `count == 0`.
    fn count_documents(&self) -> impl Future<Output = Result<Vec<CountRow>, NeedleError>> + Send;

    /// Release the connection. Consumes it so it cannot be released twice.
    fn close(self) -> impl Future<Output = Result<(), NeedleError>> + Send;
}
