//! Actuator port — the opaque "move to angle" driver.

use std::future::Future;

use needlehub_domain::command::ActuatorCommand;
use needlehub_domain::error::NeedleError;

/// Something that can be moved to an absolute angle.
pub trait Actuator: Send + Sync {
    /// Move to `command.angle`.
    ///
    /// The angle is passed through as computed, even when it lies outside the
    /// physical range; any range enforcement belongs to the implementation
    /// and is reported as [`NeedleError::Actuator`].
    fn move_to(&self, command: ActuatorCommand)
    -> impl Future<Output = Result<(), NeedleError>> + Send;
}

impl<T: Actuator> Actuator for std::sync::Arc<T> {
    fn move_to(
        &self,
        command: ActuatorCommand,
    ) -> impl Future<Output = Result<(), NeedleError>> + Send {
        (**self).move_to(command)
    }
}
