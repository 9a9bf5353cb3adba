//! # needlehub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Host one named utilization sensor behind a small JSON API
//!   (`/api/sensors/{name}`, `/api/sensors/{name}/readings`, …)
//! - Map HTTP requests into sensor operations (driving adapter)
//! - Map domain errors into HTTP status codes
//!
//! ## Dependency rule
//! Depends on `needlehub-app` (for port traits and services) and `needlehub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
