//! Utilization sensor — owns one live store connection and answers usage queries.
//!
//! The `(config, connection)` pair is published as an immutable
//! `Arc<Binding>` snapshot:
//!
//! - [`read`](UtilizationSensor::read) clones the current snapshot and queries
//!   it without holding the sensor lock, so it always computes
//!   `count / limit` from a single pair and never waits behind a writer.
//! - [`reconfigure`](UtilizationSensor::reconfigure) validates, loads the
//!   secret and connects *without* the lock, then takes the exclusive guard
//!   only to swap the snapshot. A failure at any step leaves the current pair
//!   untouched.
//! - [`close`](UtilizationSensor::close) unpublishes the snapshot and marks
//!   the sensor closed.
//!
//! A retired snapshot releases its connection only after every read that
//! observed it has finished. Reads that start after `close` fail with
//! [`NeedleError::Closed`].

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use needlehub_domain::config::SensorConfig;
use needlehub_domain::error::NeedleError;
use needlehub_domain::lifecycle::LifecyclePhase;
use needlehub_domain::reading::Reading;

use crate::ports::{DocumentStore, ReadingSource, SecretStore, StoreConnection};

/// A validated configuration and the connection opened for it.
///
/// Readers share the connection lock; retiring the binding takes it
/// exclusively and moves the connection out.
struct Binding<C> {
    config: SensorConfig,
    connection: RwLock<Option<C>>,
}

/// Exposes `count / limit` for the configured collection.
pub struct UtilizationSensor<DS: DocumentStore, SS> {
    store: DS,
    secrets: SS,
    /// `None` once closed.
    current: RwLock<Option<Arc<Binding<DS::Connection>>>>,
}

impl<DS, SS> UtilizationSensor<DS, SS>
where
    DS: DocumentStore,
    SS: SecretStore,
{
    /// Validate `config`, resolve its secret and open a connection.
    ///
    /// # Errors
    ///
    /// Returns [`NeedleError::Validation`] for a zero limit or an empty secret
    /// path, [`NeedleError::Secret`] when the secret cannot be read or has no
    /// `url`, and [`NeedleError::Connection`] when the store is unreachable.
    /// No sensor exists after a failure.
    #[tracing::instrument(skip(store, secrets, config), fields(limit = config.limit))]
    pub async fn connect(store: DS, secrets: SS, config: SensorConfig) -> Result<Self, NeedleError> {
        let binding = bind(&store, &secrets, config).await?;
        tracing::info!(
            limit = binding.config.limit,
            secret_path = %binding.config.secret_path,
            "sensor connected"
        );
        Ok(Self {
            store,
            secrets,
            current: RwLock::new(Some(Arc::new(binding))),
        })
    }

    /// Replace the configuration and connection with ones built from `config`.
    ///
    /// Either the whole swap happens or nothing changes. On success the
    /// previous connection is released once the reads still using it finish.
    ///
    /// # Errors
    ///
    /// Same as [`connect`](Self::connect), plus [`NeedleError::Closed`] when
    /// the sensor was closed in the meantime (the fresh connection is
    /// released in that case).
    #[tracing::instrument(skip(self, config), fields(limit = config.limit))]
    pub async fn reconfigure(&self, config: SensorConfig) -> Result<(), NeedleError> {
        let binding = match bind(&self.store, &self.secrets, config).await {
            Ok(binding) => Arc::new(binding),
            Err(err) => {
                tracing::warn!(%err, "reconfiguration rejected, keeping current connection");
                return Err(err);
            }
        };

        let swapped = {
            let mut current = self.current.write().await;
            match current.as_mut() {
                Some(active) => Ok(std::mem::replace(active, binding)),
                None => Err(binding),
            }
        };

        match swapped {
            Ok(previous) => {
                retire(previous).await;
                tracing::info!("sensor reconfigured");
                Ok(())
            }
            Err(unused) => {
                retire(unused).await;
                Err(NeedleError::Closed)
            }
        }
    }

    /// Run the count query and divide by the active limit.
    ///
    /// # Errors
    ///
    /// Returns [`NeedleError::Query`] when the store fails or returns no row,
    /// and [`NeedleError::Closed`] after [`close`](Self::close).
    #[tracing::instrument(skip(self))]
    pub async fn read(&self) -> Result<Reading, NeedleError> {
        loop {
            let binding = self.snapshot().await.ok_or(NeedleError::Closed)?;
            // A failed `try_read` means the binding was swapped out after the
            // snapshot was taken; the next snapshot sees its replacement.
            let Ok(connection) = binding.connection.try_read() else {
                continue;
            };
            let Some(connection) = connection.as_ref() else {
                continue;
            };

            let rows = connection.count_documents().await?;
            let reading = Reading::from_rows(&rows, binding.config.limit)?;
            tracing::debug!(
                count = reading.count,
                usage = reading.usage,
                limit = reading.limit,
                "reading taken"
            );
            return Ok(reading);
        }
    }

    /// Release the connection and enter the terminal `Closed` phase.
    ///
    /// Waits for in-flight reads to finish. Release failures are logged and
    /// swallowed. Calling it again is a no-op.
    #[tracing::instrument(skip(self))]
    pub async fn close(&self) {
        let previous = self.current.write().await.take();

        match previous {
            Some(binding) => {
                retire(binding).await;
                tracing::info!("sensor closed");
            }
            None => tracing::debug!("sensor already closed"),
        }
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> LifecyclePhase {
        match self.snapshot().await {
            Some(_) => LifecyclePhase::Connected,
            None => LifecyclePhase::Closed,
        }
    }

    /// Active configuration, or `None` once closed.
    pub async fn config(&self) -> Option<SensorConfig> {
        self.snapshot()
            .await
            .map(|binding| binding.config.clone())
    }

    /// Arbitrary command dispatch is part of the host contract but not
    /// implemented by this sensor.
    ///
    /// # Errors
    ///
    /// Always returns [`NeedleError::Unsupported`].
    #[allow(clippy::unused_async)]
    pub async fn do_command(
        &self,
        _command: serde_json::Value,
    ) -> Result<serde_json::Value, NeedleError> {
        Err(NeedleError::Unsupported("do_command"))
    }

    async fn snapshot(&self) -> Option<Arc<Binding<DS::Connection>>> {
        self.current.read().await.clone()
    }
}

impl<DS, SS> ReadingSource for UtilizationSensor<DS, SS>
where
    DS: DocumentStore,
    SS: SecretStore,
{
    fn readings(&self) -> impl Future<Output = Result<Reading, NeedleError>> + Send {
        self.read()
    }
}

/// Run the full validation chain and open a connection for `config`.
async fn bind<DS, SS>(
    store: &DS,
    secrets: &SS,
    config: SensorConfig,
) -> Result<Binding<DS::Connection>, NeedleError>
where
    DS: DocumentStore,
    SS: SecretStore,
{
    config.validate()?;
    let secret = secrets.load(config.secret_path()).await?;
    let connection = store.connect(&secret).await.inspect_err(|err| {
        tracing::error!(%err, "error connecting to document store");
    })?;
    Ok(Binding {
        config,
        connection: RwLock::new(Some(connection)),
    })
}

/// Wait for reads still holding `binding` to finish, then release its
/// connection.
async fn retire<C: StoreConnection>(binding: Arc<Binding<C>>) {
    let connection = binding.connection.write().await.take();
    if let Some(connection) = connection
        && let Err(err) = connection.close().await
    {
        tracing::warn!(%err, "failed to close document store connection");
    }
}
