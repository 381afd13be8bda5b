use std::sync::Arc;

use reorder_core::config::{AppConfig, ConfigError, LoadOptions};
use reorder_core::service::RecommendationService;
use reorder_data::{LoadError, Snapshot};
use thiserror::Error;
use tracing::{info, warn};

pub struct Application {
    pub config: AppConfig,
    pub service: Arc<RecommendationService>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("data snapshot load failed: {0}")]
    DataLoad(#[source] LoadError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

/// Missing CSV files are not fatal: the engine starts degraded and `/health`
/// reports it. Malformed rows are.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let snapshot = Snapshot::load(&config.data).map_err(BootstrapError::DataLoad)?;

    if let Some(reason) = snapshot.forecast.unavailable_reason() {
        warn!(
            event_name = "system.bootstrap.forecast_unavailable",
            correlation_id = "bootstrap",
            path = %config.data.forecast_path.display(),
            reason = %reason,
            "starting without forecast data"
        );
    }
    info!(
        event_name = "system.bootstrap.data_loaded",
        correlation_id = "bootstrap",
        history_rows = snapshot.history.len(),
        forecast_rows = snapshot.forecast.len(),
        "data snapshot loaded"
    );

    let engine = snapshot.into_engine(config.policy);
    let service = Arc::new(RecommendationService::with_cache(engine, config.cache.enabled));

    Ok(Application { config, service })
}
