//! # needlehub-adapter-virtual
//!
//! Virtual/demo devices that stand in for real hardware and services, for
//! testing and demonstration purposes.
//!
//! ## Provided devices
//!
//! | Device | Port | Behaviour |
//! |--------|------|-----------|
//! | [`VirtualStore`] | `DocumentStore` | In-memory collection whose document count is set by hand |
//! | [`VirtualServoBank`] | `ActuatorResolver` | Named servos that record every command and enforce their range |
//!
//! ## Dependency rule
//!
//! Depends on `needlehub-app` (port traits) and `needlehub-domain` only.

mod devices;

pub use devices::{
    ServoError, VirtualConnection, VirtualServo, VirtualServoBank, VirtualStore,
};
