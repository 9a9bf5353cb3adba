//! Lifecycle phases of a utilization sensor.
//!
//! `Uninitialized` is never observable: a sensor only exists once it has
//! connected, and a failed construction yields an error instead of a sensor.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// Holds a validated configuration and a live connection.
    Connected,
    /// Terminal. The connection has been released.
    Closed,
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => f.write_str("connected"),
            Self::Closed => f.write_str("closed"),
        }
    }
}
