//! Types for the recommendation engine

use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::domain::{Confidence, DemandPattern};

/// One recommended order line for a customer-item pair in the target week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub week_end_date: NaiveDate,
    pub customer: String,
    pub item_code: String,
    pub item_name: String,
    /// Observed quantity for the week; `None` for genuine forecast rows.
    pub actual_qty: Option<f64>,
    pub predicted_qty: f64,
    /// Larger of actual and predicted.
    pub base_qty: f64,
    pub recommended_qty: i64,
    pub confidence: Confidence,
    pub demand_pattern: DemandPattern,
    pub buying_cycle_weeks: Option<f64>,
    pub avg_4w: f64,
    pub avg_12w: f64,
    pub avg_24w: f64,
    pub avg_52w: f64,
    pub buffer_qty: i64,
    pub buffer_pct: f64,
    pub density: f64,
    pub cv: f64,
    pub reason_code: ReasonCode,
    pub buy_count: u32,
}

/// Aggregates over the emitted rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationSummary {
    pub week: NaiveDate,
    pub customers: usize,
    pub items: usize,
    pub total_order_qty: i64,
    pub total_predicted_qty: f64,
    pub total_buffer_qty: i64,
    pub customer_filter: String,
}

/// Result of one recommendation request. Data problems are reported here
/// with `success = false`; only unparseable dates are errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendationResponse {
    pub success: bool,
    /// The aligned week-ending Sunday, never the raw input.
    pub week: NaiveDate,
    pub week_label: String,
    pub rows: Vec<Recommendation>,
    pub summary: Option<RecommendationSummary>,
    pub error: Option<String>,
}

impl RecommendationResponse {
    pub fn unavailable(week: NaiveDate, message: impl Into<String>) -> Self {
        Self {
            success: false,
            week,
            week_label: crate::weeks::week_range_label(week),
            rows: Vec::new(),
            summary: None,
            error: Some(message.into()),
        }
    }
}

/// Human-readable justification attached to each recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCode {
    NewOrRarelyPurchased,
    LowConfidence,
    HighVolatility,
    StableBuyingPattern,
}

impl ReasonCode {
    pub fn description(&self) -> &'static str {
        match self {
            ReasonCode::NewOrRarelyPurchased => "New or rarely purchased item",
            ReasonCode::LowConfidence => "Low forecast confidence - safety buffer added",
            ReasonCode::HighVolatility => "High demand volatility",
            ReasonCode::StableBuyingPattern => "Stable buying pattern",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl Serialize for ReasonCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.description())
    }
}
