//! Weekly order recommendation engine
//!
//! Turns a week of forecast rows plus historical purchase metrics into a
//! buffered order quantity per customer-item pair, each with a reason code.

mod engine;
mod policy;
mod types;

pub use engine::RecommendationEngine;
pub use policy::{round_half_up, BufferPolicy, RecommendationPolicy, SelectionPolicy};
pub use types::*;

/// Default buffer table
pub const DEFAULT_BUFFER_POLICY: BufferPolicy = BufferPolicy {
    smooth_high_confidence: 0.05,
    smooth_other_confidence: 0.10,
    intermittent: 0.20,
    other_pattern: 0.05,
    low_confidence: 0.10,
    high_volatility: 0.10,
    volatility_threshold: 1.0,
    max_buffer_pct: 0.30,
};

/// Default item-selection thresholds
pub const DEFAULT_SELECTION_POLICY: SelectionPolicy =
    SelectionPolicy { min_predicted_qty: 1.0, core_item_min_buys: 10 };

/// Summary label when no customer filter is applied
pub const ALL_CUSTOMERS_LABEL: &str = "All";
