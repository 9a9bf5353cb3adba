//! Actuator commands — mapping a usage ratio onto a needle angle.
//!
//! The needle sweeps from `max_angle` (empty collection) down to `0` (limit
//! reached). Usage is deliberately not clamped: a collection above its limit
//! yields a negative angle and it is up to the actuator driver to enforce its
//! own range.

use serde::{Deserialize, Serialize};

/// Full-scale deflection of the reference servo, in degrees.
pub const DEFAULT_MAX_ANGLE: u32 = 115;

/// An absolute "move to angle" command, in integer degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuatorCommand {
    pub angle: i64,
}

impl ActuatorCommand {
    /// Compute `max_angle - usage * max_angle`, rounded to the nearest degree
    /// (halves away from zero).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_usage(usage: f64, max_angle: u32) -> Self {
        Self {
            angle: raw_angle(usage, max_angle).round() as i64,
        }
    }

    /// Whether the angle lies within `[0, max_angle]`.
    #[must_use]
    pub fn is_within(&self, max_angle: u32) -> bool {
        (0..=i64::from(max_angle)).contains(&self.angle)
    }

    /// The angle as an unsigned value, or `None` if it is negative or too large.
    #[must_use]
    pub fn unsigned_angle(&self) -> Option<u32> {
        u32::try_from(self.angle).ok()
    }
}

/// The unrounded angle for `usage`.
#[must_use]
pub fn raw_angle(usage: f64, max_angle: u32) -> f64 {
    let max = f64::from(max_angle);
    max - usage * max
}
