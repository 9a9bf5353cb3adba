//! Shared application state for axum handlers.

use std::sync::Arc;

use needlehub_app::ports::{DocumentStore, SecretStore};
use needlehub_app::services::utilization_sensor::UtilizationSensor;

/// Application state shared across all axum handlers.
///
/// Generic over the document store and secret store to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`.
pub struct AppState<DS: DocumentStore, SS> {
    /// Name the hosted sensor answers to.
    pub name: Arc<str>,
    /// The hosted sensor.
    pub sensor: Arc<UtilizationSensor<DS, SS>>,
}

impl<DS: DocumentStore, SS> Clone for AppState<DS, SS> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            sensor: Arc::clone(&self.sensor),
        }
    }
}

impl<DS, SS> AppState<DS, SS>
where
    DS: DocumentStore + 'static,
    SS: SecretStore + 'static,
{
    /// Create a new application state around an already shared sensor.
    ///
    /// The sensor is shared so the composition root can still reconfigure
    /// and close it outside of HTTP.
    pub fn new(name: impl Into<Arc<str>>, sensor: Arc<UtilizationSensor<DS, SS>>) -> Self {
        Self {
            name: name.into(),
            sensor,
        }
    }
}
