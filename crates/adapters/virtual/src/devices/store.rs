//! Virtual document store — a collection with a hand-set document count.

use std::sync::{Arc, Mutex};

use needlehub_app::ports::{DocumentStore, StoreConnection};
use needlehub_domain::error::NeedleError;
use needlehub_domain::reading::CountRow;
use needlehub_domain::secret::SecretDescriptor;

use super::lock;

#[derive(Debug, Default)]
struct Collection {
    count: u64,
    empty_result: bool,
    unreachable: bool,
    open_connections: usize,
    connected_urls: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("virtual store is unreachable")]
struct Unreachable;

/// A simulated store holding a single collection.
///
/// Any secret URL is accepted unless the store has been marked unreachable.
#[derive(Debug, Clone, Default)]
pub struct VirtualStore {
    collection: Arc<Mutex<Collection>>,
}

impl VirtualStore {
    /// A store whose collection holds `count` documents.
    #[must_use]
    pub fn with_count(count: u64) -> Self {
        let store = Self::default();
        store.set_count(count);
        store
    }

    pub fn set_count(&self, count: u64) {
        lock(&self.collection).count = count;
    }

    /// When set, the count aggregation yields no row at all instead of a
    /// row with `count == 0`.
    pub fn set_empty_result(&self, empty: bool) {
        lock(&self.collection).empty_result = empty;
    }

    /// When set, new connections fail with a connection error. Existing
    /// connections keep working.
    pub fn set_unreachable(&self, unreachable: bool) {
        lock(&self.collection).unreachable = unreachable;
    }

    /// Connections opened and not yet closed.
    #[must_use]
    pub fn open_connections(&self) -> usize {
        lock(&self.collection).open_connections
    }

    /// Secret URLs of every successful connection, oldest first.
    #[must_use]
    pub fn connected_urls(&self) -> Vec<String> {
        lock(&self.collection).connected_urls.clone()
    }
}

impl DocumentStore for VirtualStore {
    type Connection = VirtualConnection;

    async fn connect(&self, secret: &SecretDescriptor) -> Result<VirtualConnection, NeedleError> {
        let mut collection = lock(&self.collection);
        if collection.unreachable {
            return Err(NeedleError::Connection(Box::new(Unreachable)));
        }
        collection.open_connections += 1;
        collection.connected_urls.push(secret.url().to_string());
        tracing::debug!(open = collection.open_connections, "virtual connection opened");

        Ok(VirtualConnection {
            collection: Arc::clone(&self.collection),
        })
    }
}

/// Connection handed out by [`VirtualStore`].
#[derive(Debug)]
pub struct VirtualConnection {
    collection: Arc<Mutex<Collection>>,
}

impl StoreConnection for VirtualConnection {
    async fn count_documents(&self) -> Result<Vec<CountRow>, NeedleError> {
        let collection = lock(&self.collection);
        if collection.empty_result {
            Ok(Vec::new())
        } else {
            Ok(vec![CountRow {
                count: collection.count,
            }])
        }
    }

    async fn close(self) -> Result<(), NeedleError> {
        let mut collection = lock(&self.collection);
        collection.open_connections = collection.open_connections.saturating_sub(1);
        tracing::debug!(open = collection.open_connections, "virtual connection closed");
        Ok(())
    }
}
