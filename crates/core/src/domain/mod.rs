pub mod dataset;
pub mod forecast;
pub mod history;

pub use dataset::Dataset;
pub use forecast::{Confidence, DataSplit, DemandPattern, ForecastRow};
pub use history::{ItemKey, Observation, PairKey};
