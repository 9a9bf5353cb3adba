//! Reading source port — anything that answers utilization queries.

use std::future::Future;

use needlehub_domain::error::NeedleError;
use needlehub_domain::reading::Reading;

/// Produces one fresh [`Reading`] per call. Never cached, never retried.
pub trait ReadingSource: Send + Sync {
    fn readings(&self) -> impl Future<Output = Result<Reading, NeedleError>> + Send;
}

impl<T: ReadingSource> ReadingSource for std::sync::Arc<T> {
    fn readings(&self) -> impl Future<Output = Result<Reading, NeedleError>> + Send {
        (**self).readings()
    }
}
