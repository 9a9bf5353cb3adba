//! # needled — utilization sensor daemon
//!
//! Composition root that wires the adapters around one utilization sensor
//! and serves it over HTTP.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Pick the document store backend (`MongoDB` or virtual)
//! - Connect the sensor; a failure here aborts startup
//! - Build the axum router around the sensor
//! - Reload `needled.toml` and reconfigure the sensor on `SIGHUP`
//! - Handle graceful shutdown (SIGTERM/SIGINT), then close the sensor
//!
//! ## Dependency rule
//! This is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use needlehub_adapter_http_axum::router;
use needlehub_adapter_http_axum::state::AppState;
use needlehub_adapter_secret_file::JsonSecretFile;
use needlehub_adapter_store_mongodb::MongoStore;
use needlehub_adapter_virtual::VirtualStore;
use needlehub_app::ports::DocumentStore;
use needlehub_app::services::utilization_sensor::UtilizationSensor;

use crate::config::{Config, ConfigError, StoreBackend};

type Sensor<DS> = UtilizationSensor<DS, JsonSecretFile>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.logging.filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match config.store.backend {
        StoreBackend::Mongodb => {
            let store = MongoStore::new(config.mongo_config());
            serve(config, store).await
        }
        StoreBackend::Virtual => {
            let store = VirtualStore::with_count(config.store.virtual_count);
            serve(config, store).await
        }
    }
}

async fn serve<DS>(config: Config, store: DS) -> Result<(), Box<dyn std::error::Error>>
where
    DS: DocumentStore + 'static,
{
    // Bind first so a taken port never leaves a store connection behind.
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .inspect_err(|err| tracing::error!(%err, addr = %bind_addr, "failed to bind"))?;

    let sensor = UtilizationSensor::connect(store, JsonSecretFile::new(), config.sensor_config())
        .await
        .inspect_err(|err| tracing::error!(%err, "failed to start sensor"))?;
    let sensor = Arc::new(sensor);

    let reload = tokio::spawn(reload_on_hangup(Arc::clone(&sensor)));

    let app = router::build(AppState::new(config.sensor.name.as_str(), Arc::clone(&sensor)));
    tracing::info!(addr = %bind_addr, sensor = %config.sensor.name, "needled listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    reload.abort();
    sensor.close().await;
    served?;
    Ok(())
}

/// Re-read the configuration file and reconfigure the sensor on every `SIGHUP`.
#[cfg(unix)]
async fn reload_on_hangup<DS>(sensor: Arc<Sensor<DS>>)
where
    DS: DocumentStore + 'static,
{
    use tokio::signal::unix::{SignalKind, signal};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(err) => {
            tracing::warn!(%err, "failed to install SIGHUP handler, reload disabled");
            return;
        }
    };

    while hangup.recv().await.is_some() {
        tracing::info!("SIGHUP received, reloading configuration");
        apply_reload(&sensor, Config::load()).await;
    }
}

/// Reconfigure `sensor` from a freshly loaded configuration.
///
/// Returns `true` when the new configuration is live. On failure the sensor
/// keeps its current state.
#[cfg_attr(not(unix), allow(dead_code))]
async fn apply_reload<DS>(sensor: &Sensor<DS>, loaded: Result<Config, ConfigError>) -> bool
where
    DS: DocumentStore,
{
    let config = match loaded {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(%err, "failed to reload configuration");
            return false;
        }
    };
    match sensor.reconfigure(config.sensor_config()).await {
        Ok(()) => {
            tracing::info!(limit = config.sensor.limit, "configuration reloaded");
            true
        }
        Err(err) => {
            tracing::warn!(%err, "failed to apply reloaded configuration");
            false
        }
    }
}

#[cfg(not(unix))]
#[allow(clippy::unused_async)]
async fn reload_on_hangup<DS>(_sensor: Arc<Sensor<DS>>)
where
    DS: DocumentStore + 'static,
{
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(%err, "failed to listen for CTRL+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(err) => {
                tracing::error!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use needlehub_domain::error::NeedleError;
    use needlehub_domain::lifecycle::LifecyclePhase;

    use super::*;

    fn write_secret(dir: &Path, url: &str) -> String {
        let path = dir.join("secret.json");
        std::fs::write(&path, format!(r#"{{"url": "{url}"}}"#)).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn config(secret_path: &str, limit: u64) -> Config {
        let mut config = Config::default();
        config.sensor.limit = limit;
        config.sensor.secret_path = secret_path.to_string();
        config
    }

    #[tokio::test]
    async fn should_not_connect_sensor_when_port_is_taken() {
        let dir = tempfile::tempdir().unwrap();
        let secret = write_secret(dir.path(), "mongodb://a");
        let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mut config = config(&secret, 100);
        config.server.host = "127.0.0.1".to_string();
        config.server.port = taken.local_addr().unwrap().port();
        let store = VirtualStore::with_count(1);

        let result = serve(config, store.clone()).await;

        assert!(result.is_err());
        assert!(store.connected_urls().is_empty());
        assert_eq!(store.open_connections(), 0);
    }

    #[tokio::test]
    async fn should_apply_reloaded_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let secret = write_secret(dir.path(), "mongodb://a");
        let sensor = UtilizationSensor::connect(
            VirtualStore::with_count(1),
            JsonSecretFile::new(),
            config(&secret, 100).sensor_config(),
        )
        .await
        .unwrap();

        assert!(apply_reload(&sensor, Ok(config(&secret, 250))).await);
        assert_eq!(sensor.config().await.unwrap().limit, 250);
    }

    #[tokio::test]
    async fn should_report_reload_failure_when_sensor_is_closed() {
        let dir = tempfile::tempdir().unwrap();
        let secret = write_secret(dir.path(), "mongodb://a");
        let store = VirtualStore::with_count(1);
        let sensor = UtilizationSensor::connect(
            store.clone(),
            JsonSecretFile::new(),
            config(&secret, 100).sensor_config(),
        )
        .await
        .unwrap();
        sensor.close().await;

        assert!(!apply_reload(&sensor, Ok(config(&secret, 250))).await);
        assert_eq!(sensor.phase().await, LifecyclePhase::Closed);
        assert_eq!(store.open_connections(), 0);
        assert!(matches!(sensor.read().await, Err(NeedleError::Closed)));
    }

    #[tokio::test]
    async fn should_keep_current_state_when_reloaded_file_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let secret = write_secret(dir.path(), "mongodb://a");
        let sensor = UtilizationSensor::connect(
            VirtualStore::with_count(1),
            JsonSecretFile::new(),
            config(&secret, 100).sensor_config(),
        )
        .await
        .unwrap();

        let loaded = Err(ConfigError::Validation("port must be non-zero".to_string()));
        assert!(!apply_reload(&sensor, loaded).await);
        assert_eq!(sensor.config().await.unwrap().limit, 100);
    }
}
