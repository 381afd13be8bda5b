//! Snapshot loading for the reorder service: CSV readers for the history and
//! forecast tables, plus the deterministic demo dataset.

pub mod fixtures;
pub mod loader;

use reorder_core::config::DataConfig;
use reorder_core::domain::{Dataset, ForecastRow, Observation};
use reorder_core::recommend::{RecommendationEngine, RecommendationPolicy};

pub use loader::{
    forecast_from_reader, history_from_reader, load_forecast, load_history, LoadError,
};

/// One immutable history/forecast pair.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    pub history: Dataset<Observation>,
    pub forecast: Dataset<ForecastRow>,
}

impl Snapshot {
    pub fn load(config: &DataConfig) -> Result<Self, LoadError> {
        Ok(Self {
            history: load_history(&config.history_path)?,
            forecast: load_forecast(&config.forecast_path)?,
        })
    }

    pub fn into_engine(self, policy: RecommendationPolicy) -> RecommendationEngine {
        RecommendationEngine::with_policy(&self.history, self.forecast, policy)
    }
}
