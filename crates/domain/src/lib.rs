//! # needlehub-domain
//!
//! Pure domain model for the needlehub utilization gauge.
//!
//! ## Responsibilities
//! - Foundational types: error conventions
//! - Define the **sensor configuration** (`limit`, `secret_path`) and its validation
//! - Define the **secret descriptor** resolved from a secret file
//! - Define **readings** (`count`, `usage`) and how usage is derived from a limit
//! - Define **actuator commands** and the usage → angle mapping
//! - Name the sensor **lifecycle phases**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;

pub mod command;
pub mod config;
pub mod lifecycle;
pub mod reading;
pub mod secret;
