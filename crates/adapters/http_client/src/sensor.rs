//! Remote sensor resolution and readings.

use std::time::Duration;

use needlehub_app::ports::{ReadingSource, SensorResolver};
use needlehub_domain::error::{MalformedReading, NeedleError};
use needlehub_domain::reading::Reading;

use crate::error::ClientError;

/// Resolves sensors hosted under `{base_url}/api/sensors/`.
#[derive(Debug, Clone)]
pub struct HttpSensorResolver {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSensorResolver {
    /// Build a resolver whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn sensor_url(&self, name: &str) -> String {
        format!("{}/api/sensors/{name}", self.base_url)
    }
}

impl SensorResolver for HttpSensorResolver {
    type Sensor = HttpSensor;

    #[tracing::instrument(skip(self))]
    async fn resolve_sensor(&self, name: &str) -> Result<HttpSensor, NeedleError> {
        let url = self.sensor_url(name);
        get(&self.http, &url)
            .await
            .map_err(|err| err.into_resolve(name))?;

        Ok(HttpSensor {
            http: self.http.clone(),
            readings_url: format!("{url}/readings"),
        })
    }
}

/// Handle on one remote sensor, valid for a single controller cycle.
#[derive(Debug, Clone)]
pub struct HttpSensor {
    http: reqwest::Client,
    readings_url: String,
}

impl ReadingSource for HttpSensor {
    async fn readings(&self) -> Result<Reading, NeedleError> {
        let response = get(&self.http, &self.readings_url)
            .await
            .map_err(ClientError::into_read)?;
        let body = response
            .bytes()
            .await
            .map_err(|err| ClientError::from(err).into_read())?;
        let map: serde_json::Value = serde_json::from_slice(&body)
            .map_err(|err| MalformedReading::Decode(Box::new(err)))?;
        Ok(parse_readings(&map)?)
    }
}

async fn get(http: &reqwest::Client, url: &str) -> Result<reqwest::Response, ClientError> {
    let response = http.get(url).send().await?;
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::UnexpectedStatus { status, body })
    }
}

/// Check the shape of a readings map and turn it into a [`Reading`].
///
/// `count` must be a non-negative integer and `usage` a number. `limit` is
/// optional and defaults to `0` when the host does not report it.
///
/// # Errors
///
/// Returns [`MalformedReading::Field`] naming the first offending field.
pub fn parse_readings(map: &serde_json::Value) -> Result<Reading, MalformedReading> {
    let count = map
        .get("count")
        .and_then(serde_json::Value::as_u64)
        .ok_or(MalformedReading::Field("count"))?;
    let usage = map
        .get("usage")
        .and_then(serde_json::Value::as_f64)
        .ok_or(MalformedReading::Field("usage"))?;
    let limit = match map.get("limit") {
        None => 0,
        Some(limit) => limit.as_u64().ok_or(MalformedReading::Field("limit"))?,
    };

    Ok(Reading::observed(count, usage, limit))
}
