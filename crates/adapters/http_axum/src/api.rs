//! JSON API handlers.
//!
//! - `GET  /api/sensors/{name}`          — sensor name, lifecycle phase and active configuration
//! - `GET  /api/sensors/{name}/readings` — fresh `{count, usage, limit}` map
//! - `PUT  /api/sensors/{name}/config`   — atomically reconfigure the sensor
//! - `POST /api/sensors/{name}/command`  — arbitrary command dispatch (not implemented)

#[allow(clippy::missing_errors_doc)]
pub mod sensors;

use axum::Router;
use axum::routing::{get, post, put};

use needlehub_app::ports::{DocumentStore, SecretStore};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<DS, SS>() -> Router<AppState<DS, SS>>
where
    DS: DocumentStore + 'static,
    SS: SecretStore + 'static,
{
    Router::new()
        .route("/sensors/{name}", get(sensors::get::<DS, SS>))
        .route("/sensors/{name}/readings", get(sensors::readings::<DS, SS>))
        .route("/sensors/{name}/config", put(sensors::configure::<DS, SS>))
        .route("/sensors/{name}/command", post(sensors::command::<DS, SS>))
}
