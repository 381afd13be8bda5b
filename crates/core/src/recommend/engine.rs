//! Recommendation engine implementation

use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use super::policy::{round_half_up, RecommendationPolicy};
use super::types::*;
use super::ALL_CUSTOMERS_LABEL;
use crate::domain::{DataSplit, Dataset, ForecastRow, Observation, PairKey};
use crate::errors::DomainError;
use crate::metrics::{finite_or_zero, HistoricalMetricsEngine};
use crate::weeks;

/// Recommendation engine bound to one immutable history/forecast snapshot.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    metrics: HistoricalMetricsEngine,
    forecast: Dataset<ForecastRow>,
    policy: RecommendationPolicy,
}

impl RecommendationEngine {
    /// Build with the default policy. Historical metrics are derived here,
    /// once per snapshot.
    pub fn new(history: &Dataset<Observation>, forecast: Dataset<ForecastRow>) -> Self {
        Self::with_policy(history, forecast, RecommendationPolicy::default())
    }

    pub fn with_policy(
        history: &Dataset<Observation>,
        forecast: Dataset<ForecastRow>,
        policy: RecommendationPolicy,
    ) -> Self {
        Self { metrics: HistoricalMetricsEngine::from_history(history), forecast, policy }
    }

    pub fn metrics(&self) -> &HistoricalMetricsEngine {
        &self.metrics
    }

    pub fn forecast(&self) -> &Dataset<ForecastRow> {
        &self.forecast
    }

    pub fn policy(&self) -> &RecommendationPolicy {
        &self.policy
    }

    /// Recommend orders for the week containing `target_date`.
    pub fn recommend(
        &self,
        target_date: &str,
        customer_filter: Option<&str>,
    ) -> Result<RecommendationResponse, DomainError> {
        let week = weeks::align(target_date)?;
        Ok(self.recommend_week(week, customer_filter))
    }

    /// Recommend orders for an already aligned week-ending Sunday.
    pub fn recommend_week(
        &self,
        week: NaiveDate,
        customer_filter: Option<&str>,
    ) -> RecommendationResponse {
        let customer_filter = customer_filter.filter(|value| !value.is_empty());

        let rows = match &self.forecast {
            Dataset::Unavailable { reason } => {
                return RecommendationResponse::unavailable(week, reason.clone());
            }
            Dataset::Loaded(rows) if rows.is_empty() => {
                return RecommendationResponse::unavailable(week, "Prediction data not available");
            }
            Dataset::Loaded(rows) => rows,
        };

        let selected: Vec<&ForecastRow> =
            rows.iter().filter(|row| row.week_end_date == week).collect();
        if selected.is_empty() {
            return RecommendationResponse::unavailable(
                week,
                format!("No prediction data available for date {week}"),
            );
        }

        let candidates = prefer_test_rows(&selected);
        debug!(
            event_name = "recommend.week.selected",
            week = %week,
            selected = selected.len(),
            candidates = candidates.len(),
            "forecast rows selected for week"
        );

        let mut recommendations: Vec<Recommendation> = candidates
            .into_iter()
            .filter_map(|row| self.score_row(row))
            .filter(|recommendation| {
                customer_filter.map_or(true, |customer| recommendation.customer == customer)
            })
            .collect();

        recommendations.sort_by(|a, b| {
            a.customer
                .cmp(&b.customer)
                .then_with(|| b.recommended_qty.cmp(&a.recommended_qty))
                .then_with(|| a.item_code.cmp(&b.item_code))
        });

        debug!(
            event_name = "recommend.week.scored",
            week = %week,
            rows = recommendations.len(),
            customer_filter = customer_filter.unwrap_or(ALL_CUSTOMERS_LABEL),
            "recommendations scored after eligibility filter"
        );

        let summary = summarize(week, &recommendations, customer_filter);
        RecommendationResponse {
            success: true,
            week,
            week_label: weeks::week_range_label(week),
            rows: recommendations,
            summary: Some(summary),
            error: None,
        }
    }

    /// Join metrics, apply eligibility and compute quantities for one row.
    fn score_row(&self, row: &ForecastRow) -> Option<Recommendation> {
        let derived = self.metrics.lookup(&row.item_key());
        let predicted_qty = finite_or_zero(row.predicted_quantity);

        if !self.policy.selection.is_eligible(predicted_qty, derived.buy_count) {
            return None;
        }

        let actual_qty = match row.data_split {
            DataSplit::Forecast => row.actual_quantity.filter(|value| value.is_finite()),
            DataSplit::Test | DataSplit::Train => {
                Some(row.actual_quantity.map_or(0.0, finite_or_zero))
            }
        };
        let base_qty = actual_qty.unwrap_or(0.0).max(predicted_qty);
        let buffer_pct =
            self.policy.buffer.buffer_pct(&row.demand_pattern, row.confidence, derived.cv);
        let buffer_qty = round_half_up(base_qty * buffer_pct);
        let recommended_qty = round_half_up(base_qty + buffer_qty as f64);

        Some(Recommendation {
            week_end_date: row.week_end_date,
            customer: row.customer.clone(),
            item_code: row.item_code.clone(),
            item_name: row.item_name.clone(),
            actual_qty,
            predicted_qty,
            base_qty,
            recommended_qty,
            confidence: row.confidence,
            demand_pattern: row.demand_pattern.clone(),
            buying_cycle_weeks: derived.buying_cycle_weeks,
            avg_4w: derived.avg_4w,
            avg_12w: derived.avg_12w,
            avg_24w: derived.avg_24w,
            avg_52w: derived.avg_52w,
            buffer_qty,
            buffer_pct,
            density: derived.density,
            cv: derived.cv,
            reason_code: self.policy.reason_code(derived.buy_count, row.confidence, derived.cv),
            buy_count: derived.buy_count,
        })
    }

    /// Distinct customer names in the forecast, sorted.
    pub fn customers(&self) -> Vec<String> {
        self.forecast
            .rows()
            .iter()
            .map(|row| row.customer.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct week-ending Sundays in the forecast, optionally restricted to
    /// one data split.
    pub fn available_weeks(&self, split: Option<DataSplit>) -> Vec<NaiveDate> {
        self.forecast
            .rows()
            .iter()
            .filter(|row| split.map_or(true, |split| row.data_split == split))
            .map(|row| weeks::week_end(row.week_end_date))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Keep every Test row, plus Forecast rows whose pair has no Test row.
/// Train rows never reach the recommendation.
fn prefer_test_rows<'a>(rows: &[&'a ForecastRow]) -> Vec<&'a ForecastRow> {
    let tested: HashSet<PairKey> = rows
        .iter()
        .filter(|row| row.data_split == DataSplit::Test)
        .map(|row| row.pair_key())
        .collect();

    let test_rows = rows.iter().copied().filter(|row| row.data_split == DataSplit::Test);
    let forecast_rows = rows
        .iter()
        .copied()
        .filter(|row| row.data_split == DataSplit::Forecast && !tested.contains(&row.pair_key()));

    test_rows.chain(forecast_rows).collect()
}

fn summarize(
    week: NaiveDate,
    rows: &[Recommendation],
    customer_filter: Option<&str>,
) -> RecommendationSummary {
    let customers: HashSet<&str> = rows.iter().map(|row| row.customer.as_str()).collect();

    RecommendationSummary {
        week,
        customers: customers.len(),
        items: rows.len(),
        total_order_qty: rows.iter().map(|row| row.recommended_qty).sum(),
        total_predicted_qty: rows.iter().map(|row| row.predicted_qty).sum(),
        total_buffer_qty: rows.iter().map(|row| row.buffer_qty).sum(),
        customer_filter: customer_filter.unwrap_or(ALL_CUSTOMERS_LABEL).to_owned(),
    }
}
