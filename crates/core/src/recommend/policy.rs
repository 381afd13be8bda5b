//! Buffer sizing, item eligibility and reason codes

use serde::{Deserialize, Serialize};

use super::types::ReasonCode;
use crate::domain::{Confidence, DemandPattern};

/// Safety-buffer contributions, summed then capped at `max_buffer_pct`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BufferPolicy {
    /// Smooth demand with a high-confidence forecast (default: 0.05)
    pub smooth_high_confidence: f64,
    /// Smooth demand with any other confidence (default: 0.10)
    pub smooth_other_confidence: f64,
    /// Intermittent demand (default: 0.20)
    pub intermittent: f64,
    /// Lumpy, sparse or unrecognized patterns (default: 0.05)
    pub other_pattern: f64,
    /// Added on top when confidence is Low (default: 0.10)
    pub low_confidence: f64,
    /// Added on top when cv exceeds `volatility_threshold` (default: 0.10)
    pub high_volatility: f64,
    /// cv above which demand counts as volatile (default: 1.0)
    pub volatility_threshold: f64,
    /// Upper bound of the buffer percentage (default: 0.30)
    pub max_buffer_pct: f64,
}

impl Default for BufferPolicy {
    fn default() -> Self {
        super::DEFAULT_BUFFER_POLICY
    }
}

impl BufferPolicy {
    pub fn buffer_pct(&self, pattern: &DemandPattern, confidence: Confidence, cv: f64) -> f64 {
        let mut pct = match pattern {
            DemandPattern::Smooth if confidence == Confidence::High => self.smooth_high_confidence,
            DemandPattern::Smooth => self.smooth_other_confidence,
            DemandPattern::Intermittent => self.intermittent,
            DemandPattern::Lumpy | DemandPattern::Sparse | DemandPattern::Other(_) => {
                self.other_pattern
            }
        };

        if confidence == Confidence::Low {
            pct += self.low_confidence;
        }
        if self.is_volatile(cv) {
            pct += self.high_volatility;
        }

        pct.min(self.max_buffer_pct).max(0.0)
    }

    pub fn is_volatile(&self, cv: f64) -> bool {
        cv > self.volatility_threshold
    }
}

/// Which forecast rows are worth recommending at all.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelectionPolicy {
    /// Minimum predicted units for a regular item (default: 1.0)
    pub min_predicted_qty: f64,
    /// Purchase weeks from which an item is kept regardless of forecast (default: 10)
    pub core_item_min_buys: u32,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        super::DEFAULT_SELECTION_POLICY
    }
}

impl SelectionPolicy {
    /// Items need purchase history, and either a real forecast signal or
    /// enough purchases to count as a staple.
    pub fn is_eligible(&self, predicted_qty: f64, buy_count: u32) -> bool {
        buy_count > 0
            && (predicted_qty >= self.min_predicted_qty || buy_count >= self.core_item_min_buys)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RecommendationPolicy {
    pub buffer: BufferPolicy,
    pub selection: SelectionPolicy,
}

impl RecommendationPolicy {
    /// First matching rule wins.
    pub fn reason_code(&self, buy_count: u32, confidence: Confidence, cv: f64) -> ReasonCode {
        if buy_count == 0 {
            ReasonCode::NewOrRarelyPurchased
        } else if confidence == Confidence::Low {
            ReasonCode::LowConfidence
        } else if self.buffer.is_volatile(cv) {
            ReasonCode::HighVolatility
        } else {
            ReasonCode::StableBuyingPattern
        }
    }
}

/// Round half up to whole units; non-finite input becomes 0.
pub fn round_half_up(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value + 0.5).floor() as i64
}
