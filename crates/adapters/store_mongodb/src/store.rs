//! `MongoDB` client lifecycle and the count aggregation.

use mongodb::bson::{Bson, Document, doc};
use mongodb::{Client, Collection};
use serde::Deserialize;

use needlehub_app::ports::{DocumentStore, StoreConnection};
use needlehub_domain::error::{NeedleError, QueryError};
use needlehub_domain::reading::CountRow;
use needlehub_domain::secret::SecretDescriptor;

use crate::error::MongoError;

/// Where the measured collection lives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MongoStoreConfig {
    pub database: String,
    pub collection: String,
}

impl Default for MongoStoreConfig {
    fn default() -> Self {
        Self {
            database: "syncDB".to_string(),
            collection: "data_federations".to_string(),
        }
    }
}

/// Opens [`MongoConnection`]s against one database/collection pair.
#[derive(Debug, Clone, Default)]
pub struct MongoStore {
    config: MongoStoreConfig,
}

impl MongoStore {
    #[must_use]
    pub fn new(config: MongoStoreConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &MongoStoreConfig {
        &self.config
    }
}

impl DocumentStore for MongoStore {
    type Connection = MongoConnection;

    #[tracing::instrument(skip(self, secret), fields(database = %self.config.database, collection = %self.config.collection))]
    async fn connect(&self, secret: &SecretDescriptor) -> Result<MongoConnection, NeedleError> {
        let client = Client::with_uri_str(secret.url())
            .await
            .map_err(MongoError::Client)?;
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(MongoError::Ping)?;

        let collection = client
            .database(&self.config.database)
            .collection::<Document>(&self.config.collection);
        tracing::debug!("connected to mongodb");
        Ok(MongoConnection { client, collection })
    }
}

/// One live client, owned by a single sensor binding.
pub struct MongoConnection {
    client: Client,
    collection: Collection<Document>,
}

impl StoreConnection for MongoConnection {
    async fn count_documents(&self) -> Result<Vec<CountRow>, NeedleError> {
        let mut cursor = self
            .collection
            .aggregate([doc! { "$count": "count" }])
            .await
            .map_err(MongoError::Aggregate)?;

        let mut rows = Vec::new();
        while cursor.advance().await.map_err(MongoError::Aggregate)? {
            let document = cursor
                .deserialize_current()
                .map_err(MongoError::Aggregate)?;
            rows.push(count_row(&document)?);
        }
        Ok(rows)
    }

    async fn close(self) -> Result<(), NeedleError> {
        let Self { client, collection } = self;
        drop(collection);
        client.shutdown().await;
        tracing::debug!("mongodb client shut down");
        Ok(())
    }
}

/// Read the `count` field of one aggregation result document.
///
/// `$count` yields an `int` or a `long` depending on the magnitude.
///
/// # Errors
///
/// Returns [`QueryError::MissingCount`] when the field is absent, negative or
/// not an integer.
pub fn count_row(document: &Document) -> Result<CountRow, QueryError> {
    let count = match document.get("count") {
        Some(Bson::Int32(count)) => u64::try_from(*count).ok(),
        Some(Bson::Int64(count)) => u64::try_from(*count).ok(),
        _ => None,
    };
    count
        .map(|count| CountRow { count })
        .ok_or(QueryError::MissingCount)
}
