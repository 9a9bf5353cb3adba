//! JSON handlers for the hosted sensor.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use needlehub_app::ports::{DocumentStore, SecretStore};
use needlehub_domain::config::SensorConfig;
use needlehub_domain::error::{NeedleError, ResolveError};
use needlehub_domain::lifecycle::LifecyclePhase;

use crate::error::ApiError;
use crate::state::AppState;

/// Sensor metadata.
#[derive(Debug, Serialize)]
pub struct SensorBody {
    pub name: String,
    pub phase: LifecyclePhase,
    /// `None` once the sensor is closed.
    pub config: Option<SensorConfig>,
}

/// The readings map.
#[derive(Debug, Serialize)]
pub struct ReadingsBody {
    pub count: u64,
    pub usage: f64,
    pub limit: u64,
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<SensorBody>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the readings endpoint.
pub enum ReadingsResponse {
    Ok(Json<ReadingsBody>),
}

impl IntoResponse for ReadingsResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the configure endpoint.
pub enum ConfigureResponse {
    NoContent,
}

impl IntoResponse for ConfigureResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Possible responses from the command endpoint.
pub enum CommandResponse {
    Ok(Json<serde_json::Value>),
}

impl IntoResponse for CommandResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

fn ensure_hosted<DS: DocumentStore, SS>(
    state: &AppState<DS, SS>,
    name: &str,
) -> Result<(), ApiError> {
    if *state.name == *name {
        Ok(())
    } else {
        Err(NeedleError::from(ResolveError::NotFound {
            name: name.to_string(),
        })
        .into())
    }
}

/// `GET /api/sensors/{name}`
pub async fn get<DS, SS>(
    State(state): State<AppState<DS, SS>>,
    Path(name): Path<String>,
) -> Result<GetResponse, ApiError>
where
    DS: DocumentStore + 'static,
    SS: SecretStore + 'static,
{
    ensure_hosted(&state, &name)?;
    Ok(GetResponse::Ok(Json(SensorBody {
        name,
        phase: state.sensor.phase().await,
        config: state.sensor.config().await,
    })))
}

/// `GET /api/sensors/{name}/readings`
pub async fn readings<DS, SS>(
    State(state): State<AppState<DS, SS>>,
    Path(name): Path<String>,
) -> Result<ReadingsResponse, ApiError>
where
    DS: DocumentStore + 'static,
    SS: SecretStore + 'static,
{
    ensure_hosted(&state, &name)?;
    let reading = state.sensor.read().await?;
    Ok(ReadingsResponse::Ok(Json(ReadingsBody {
        count: reading.count,
        usage: reading.usage,
        limit: reading.limit,
    })))
}

/// `PUT /api/sensors/{name}/config`
pub async fn configure<DS, SS>(
    State(state): State<AppState<DS, SS>>,
    Path(name): Path<String>,
    Json(config): Json<SensorConfig>,
) -> Result<ConfigureResponse, ApiError>
where
    DS: DocumentStore + 'static,
    SS: SecretStore + 'static,
{
    ensure_hosted(&state, &name)?;
    state.sensor.reconfigure(config).await?;
    Ok(ConfigureResponse::NoContent)
}

/// `POST /api/sensors/{name}/command`
pub async fn command<DS, SS>(
    State(state): State<AppState<DS, SS>>,
    Path(name): Path<String>,
    Json(command): Json<serde_json::Value>,
) -> Result<CommandResponse, ApiError>
where
    DS: DocumentStore + 'static,
    SS: SecretStore + 'static,
{
    ensure_hosted(&state, &name)?;
    let result = state.sensor.do_command(command).await?;
    Ok(CommandResponse::Ok(Json(result)))
}
