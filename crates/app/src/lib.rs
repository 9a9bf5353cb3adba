//! # needlehub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SecretStore` — resolve a secret descriptor from a path
//!   - `DocumentStore` / `StoreConnection` — open a connection, run the count query
//!   - `Actuator` — move to an absolute angle
//!   - `SensorResolver` / `ActuatorResolver` — look up named resources
//! - Define **driving/inbound** use-cases:
//!   - `UtilizationSensor` — construct, reconfigure, read, close
//!   - `FeedbackController` — poll a sensor and drive an actuator on a fixed cadence
//!
//! ## Dependency rule
//! Depends on `needlehub-domain` only (plus `tokio` for locks and timers).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod feedback_controller;
pub mod ports;
pub mod services;
