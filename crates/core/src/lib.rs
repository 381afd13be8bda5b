pub mod cache;
pub mod config;
pub mod domain;
pub mod errors;
pub mod metrics;
pub mod recommend;
pub mod service;
pub mod weeks;

pub use cache::{CacheKey, RecommendationCache};
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::{
    Confidence, DataSplit, Dataset, DemandPattern, ForecastRow, ItemKey, Observation, PairKey,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use metrics::{DerivedMetrics, HistoricalMetric, HistoricalMetricsEngine};
pub use recommend::{
    ReasonCode, Recommendation, RecommendationEngine, RecommendationPolicy,
    RecommendationResponse, RecommendationSummary,
};
pub use service::RecommendationService;
