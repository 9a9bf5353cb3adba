//! # needle-controller — utilization needle driver
//!
//! Composition root for the feedback loop.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Resolve the sensor over HTTP from a `needled` instance
//! - Drive a virtual servo with the configured range
//! - Run the loop until Ctrl-C, or exit non-zero when a resource cannot be
//!   resolved
//!
//! ## Dependency rule
//! This is the wiring layer — no domain logic belongs here.

mod config;

use needlehub_adapter_http_client::HttpSensorResolver;
use needlehub_adapter_virtual::{VirtualServo, VirtualServoBank};
use needlehub_app::feedback_controller::FeedbackController;

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&config.logging.filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = config.controller_settings();
    let sensors = HttpSensorResolver::new(config.sensor.base_url.as_str(), config.request_timeout())?;
    let servos = VirtualServoBank::default().with_servo(VirtualServo::new(
        settings.actuator_name.as_str(),
        config.actuator.max_angle,
    ));

    tracing::info!(sensor_host = %config.sensor.base_url, "needle-controller starting");
    let controller = FeedbackController::new(sensors, servos, settings);
    controller.run_until(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for CTRL+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
