//! Virtual servo — records commands and enforces a `[0, max_angle]` range.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use needlehub_app::ports::{Actuator, ActuatorResolver};
use needlehub_domain::command::{ActuatorCommand, DEFAULT_MAX_ANGLE};
use needlehub_domain::error::{NeedleError, ResolveError};

use super::lock;

/// Why a virtual servo refused a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServoError {
    #[error("angle {angle} is outside the servo range 0..={max_angle}")]
    OutOfRange { angle: i64, max_angle: u32 },
}

#[derive(Debug, Default)]
struct ServoState {
    commands: Vec<i64>,
    position: Option<u32>,
}

/// A simulated hobby servo.
///
/// Every command is recorded, including refused ones; only commands within
/// range change the position.
#[derive(Debug, Clone)]
pub struct VirtualServo {
    name: String,
    max_angle: u32,
    state: Arc<Mutex<ServoState>>,
}

impl VirtualServo {
    #[must_use]
    pub fn new(name: impl Into<String>, max_angle: u32) -> Self {
        Self {
            name: name.into(),
            max_angle,
            state: Arc::default(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Angles of every command received, oldest first.
    #[must_use]
    pub fn commands(&self) -> Vec<i64> {
        lock(&self.state).commands.clone()
    }

    /// Current position, `None` until a command has been accepted.
    #[must_use]
    pub fn position(&self) -> Option<u32> {
        lock(&self.state).position
    }
}

impl Actuator for VirtualServo {
    async fn move_to(&self, command: ActuatorCommand) -> Result<(), NeedleError> {
        let mut state = lock(&self.state);
        state.commands.push(command.angle);

        let angle = command
            .unsigned_angle()
            .filter(|angle| *angle <= self.max_angle)
            .ok_or_else(|| {
                NeedleError::Actuator(Box::new(ServoError::OutOfRange {
                    angle: command.angle,
                    max_angle: self.max_angle,
                }))
            })?;
        state.position = Some(angle);
        tracing::debug!(servo = %self.name, angle, "virtual servo moved");
        Ok(())
    }
}

/// A set of named servos, resolvable by name.
#[derive(Debug, Clone, Default)]
pub struct VirtualServoBank {
    servos: HashMap<String, VirtualServo>,
}

impl VirtualServoBank {
    /// A bank holding a single servo named `servo-2` with the reference range.
    #[must_use]
    pub fn reference() -> Self {
        Self::default().with_servo(VirtualServo::new("servo-2", DEFAULT_MAX_ANGLE))
    }

    #[must_use]
    pub fn with_servo(mut self, servo: VirtualServo) -> Self {
        self.servos.insert(servo.name.clone(), servo);
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VirtualServo> {
        self.servos.get(name)
    }
}

impl ActuatorResolver for VirtualServoBank {
    type Actuator = VirtualServo;

    async fn resolve_actuator(&self, name: &str) -> Result<VirtualServo, NeedleError> {
        self.servos.get(name).cloned().ok_or_else(|| {
            ResolveError::NotFound {
                name: name.to_string(),
            }
            .into()
        })
    }
}
