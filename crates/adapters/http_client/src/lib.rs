//! # needlehub-adapter-http-client
//!
//! Controller-side access to a sensor hosted by `needled`, over HTTP using
//! [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement the `SensorResolver` port: `GET /api/sensors/{name}`
//! - Implement the `ReadingSource` port: `GET /api/sensors/{name}/readings`
//! - Check the shape of the readings map before it reaches the controller
//!
//! ## Error mapping
//!
//! | Situation | Error |
//! |-----------|-------|
//! | resolve: `404` | `ResolveError::NotFound` |
//! | resolve: transport failure or other status | `ResolveError::Unreachable` |
//! | read: error body tagged `empty_result` / `missing_count` | `QueryError::EmptyResult` / `QueryError::MissingCount` |
//! | read: error body tagged `closed` | `NeedleError::Closed` |
//! | read: transport failure or any other non-success status | `QueryError::Store` |
//! | read: body is not JSON, or a field is missing | `MalformedReading` |
//!
//! ## Dependency rule
//! Depends on `needlehub-app` (for port traits) and `needlehub-domain` (for domain types).

pub mod error;
pub mod sensor;

pub use error::ClientError;
pub use sensor::{HttpSensor, HttpSensorResolver, parse_readings};
