//! Resolver ports — look up the controller's collaborators by name each cycle.

use std::future::Future;

use needlehub_domain::error::NeedleError;

use super::{Actuator, ReadingSource};

/// Resolves a sensor handle by name.
pub trait SensorResolver: Send + Sync {
    type Sensor: ReadingSource;

    /// Look up the sensor called `name`.
    ///
    /// The returned handle lives for one controller cycle only.
    fn resolve_sensor(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Self::Sensor, NeedleError>> + Send;
}

/// Resolves an actuator handle by name.
pub trait ActuatorResolver: Send + Sync {
    type Actuator: Actuator;

    fn resolve_actuator(
        &self,
        name: &str,
    ) -> impl Future<Output = Result<Self::Actuator, NeedleError>> + Send;
}
