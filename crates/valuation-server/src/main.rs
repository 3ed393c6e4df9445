//! Valuation server - Mumbai property valuation service
//!
//! Serves the property details form and predicts price per square foot
//! and total value from a pre-trained model loaded once at startup.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use valuation_lib::{
    health::components, HealthRegistry, StructuredLogger, ValuationMetrics, ValuationPredictor,
};
use valuation_server::{api, config};

const SERVICE_NAME: &str = "valuation-server";
const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = config::ServerConfig::load()?;
    let logger = StructuredLogger::new(SERVICE_NAME);
    logger.log_startup(SERVICE_VERSION, &config.artifact_path);

    let health_registry = HealthRegistry::new();
    health_registry.register(components::API).await;
    health_registry.register(components::PREDICTOR).await;

    let metrics = ValuationMetrics::new();
    let predictor = Arc::new(ValuationPredictor::from_path(&config.artifact_path));

    // Without a model no prediction is possible, so a load failure stops startup.
    let start = Instant::now();
    let info = match predictor.model_info() {
        Ok(info) => info,
        Err(e) => {
            error!(artifact = %config.artifact_path, error = %e, "Cannot start without a model");
            return Err(e).with_context(|| {
                format!("Failed to load model artifact {}", config.artifact_path)
            });
        }
    };
    let elapsed = start.elapsed();
    metrics.observe_model_load(elapsed.as_secs_f64());
    metrics.set_model_info(&info.name, &info.version, &info.estimator);
    logger.log_model_loaded(
        &info.name,
        &info.version,
        &info.estimator,
        elapsed.as_millis() as u64,
    );
    health_registry.set_model_loaded(&info.version).await;

    let app_state = Arc::new(api::AppState::new(
        predictor,
        health_registry,
        metrics,
        logger.clone(),
    ));

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
    };

    api::serve(&config.listen_addr(), app_state, shutdown).await?;

    logger.log_shutdown("SIGINT received");
    info!("Shut down");

    Ok(())
}
