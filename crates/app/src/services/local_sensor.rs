//! In-process [`SensorResolver`] for a single named sensor.
//!
//! Used when the controller and the sensor share a process (tests, demos).

use std::sync::Arc;

use needlehub_domain::error::{NeedleError, ResolveError};

use crate::ports::{ReadingSource, SensorResolver};

/// Resolves exactly one sensor, registered under `name`.
pub struct LocalSensor<S> {
    name: String,
    sensor: Arc<S>,
}

impl<S> LocalSensor<S> {
    pub fn new(name: impl Into<String>, sensor: Arc<S>) -> Self {
        Self {
            name: name.into(),
            sensor,
        }
    }
}

impl<S: ReadingSource> SensorResolver for LocalSensor<S> {
    type Sensor = Arc<S>;

    async fn resolve_sensor(&self, name: &str) -> Result<Arc<S>, NeedleError> {
        if name != self.name {
            return Err(ResolveError::NotFound {
                name: name.to_string(),
            }
            .into());
        }
        Ok(Arc::clone(&self.sensor))
    }
}
