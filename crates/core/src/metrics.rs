//! Historical purchase metrics per customer-item pair.
//!
//! Derived once from a history snapshot: rolling averages, volatility,
//! purchase density, average buying cycle and lifetime purchase count. The
//! tables are immutable for the lifetime of the engine that owns them.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{Dataset, ItemKey, Observation, PairKey};

/// Rolling-average horizons, in weeks.
pub const ROLLING_WINDOWS: [usize; 4] = [4, 12, 24, 52];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoricalMetric {
    pub customer: String,
    pub item_code: String,
    pub item_name: String,
    pub avg_4w: f64,
    pub avg_12w: f64,
    pub avg_24w: f64,
    pub avg_52w: f64,
    pub mean_qty: f64,
    /// Sample standard deviation; `0` for single-week groups.
    pub std_qty: f64,
    pub cv: f64,
    pub density: f64,
    pub non_zero_weeks: u32,
    pub total_weeks: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BuyingCycle {
    pub customer: String,
    pub item_code: String,
    pub avg_cycle_weeks: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PurchaseCount {
    pub customer: String,
    pub item_code: String,
    pub buy_count: u32,
}

/// Metrics joined onto a forecast row, with every missing value defaulted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DerivedMetrics {
    pub avg_4w: f64,
    pub avg_12w: f64,
    pub avg_24w: f64,
    pub avg_52w: f64,
    pub cv: f64,
    pub density: f64,
    pub buy_count: u32,
    pub buying_cycle_weeks: Option<f64>,
}

#[derive(Clone, Debug, Default)]
pub struct HistoricalMetricsEngine {
    metrics: HashMap<ItemKey, HistoricalMetric>,
    cycles: HashMap<PairKey, BuyingCycle>,
    purchase_counts: HashMap<PairKey, PurchaseCount>,
}

impl HistoricalMetricsEngine {
    /// Build from a history dataset. An unavailable or empty history yields
    /// empty tables rather than an error.
    pub fn from_history(history: &Dataset<Observation>) -> Self {
        if let Some(reason) = history.unavailable_reason() {
            warn!(
                event_name = "metrics.history.unavailable",
                reason = %reason,
                "history unavailable; derived metrics default to zero"
            );
            return Self::default();
        }

        Self::from_observations(history.rows())
    }

    pub fn from_observations(observations: &[Observation]) -> Self {
        if observations.is_empty() {
            warn!(
                event_name = "metrics.history.empty",
                "history is empty; derived metrics default to zero"
            );
            return Self::default();
        }

        let engine = Self {
            metrics: compute_item_metrics(observations),
            cycles: compute_buying_cycles(observations),
            purchase_counts: compute_purchase_counts(observations),
        };

        debug!(
            event_name = "metrics.history.computed",
            observations = observations.len(),
            item_groups = engine.metrics.len(),
            buying_cycles = engine.cycles.len(),
            purchase_counts = engine.purchase_counts.len(),
            "historical metrics computed"
        );

        engine
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.cycles.is_empty() && self.purchase_counts.is_empty()
    }

    pub fn metric(&self, key: &ItemKey) -> Option<&HistoricalMetric> {
        self.metrics.get(key)
    }

    pub fn buying_cycle(&self, key: &PairKey) -> Option<&BuyingCycle> {
        self.cycles.get(key)
    }

    pub fn purchase_count(&self, key: &PairKey) -> Option<&PurchaseCount> {
        self.purchase_counts.get(key)
    }

    pub fn metrics(&self) -> impl Iterator<Item = &HistoricalMetric> {
        self.metrics.values()
    }

    /// Left-join semantics: metrics by `(customer, item_code, item_name)`,
    /// cycle and purchase count by `(customer, item_code)`.
    pub fn lookup(&self, item: &ItemKey) -> DerivedMetrics {
        let pair = PairKey::new(&item.customer, &item.item_code);
        let mut derived = DerivedMetrics {
            buy_count: self.purchase_count(&pair).map_or(0, |count| count.buy_count),
            buying_cycle_weeks: self
                .buying_cycle(&pair)
                .map(|cycle| cycle.avg_cycle_weeks)
                .filter(|weeks| weeks.is_finite()),
            ..DerivedMetrics::default()
        };

        if let Some(metric) = self.metric(item) {
            derived.avg_4w = finite_or_zero(metric.avg_4w);
            derived.avg_12w = finite_or_zero(metric.avg_12w);
            derived.avg_24w = finite_or_zero(metric.avg_24w);
            derived.avg_52w = finite_or_zero(metric.avg_52w);
            derived.cv = finite_or_zero(metric.cv);
            derived.density = finite_or_zero(metric.density);
        }

        derived
    }
}

fn compute_item_metrics(observations: &[Observation]) -> HashMap<ItemKey, HistoricalMetric> {
    let mut groups: BTreeMap<ItemKey, Vec<(NaiveDate, f64)>> = BTreeMap::new();
    for observation in observations {
        groups
            .entry(observation.item_key())
            .or_default()
            .push((observation.week_end_date, finite_or_zero(observation.quantity)));
    }

    groups
        .into_iter()
        .map(|(key, mut weeks)| {
            weeks.sort_by_key(|(week, _)| *week);
            let quantities: Vec<f64> = weeks.iter().map(|(_, quantity)| *quantity).collect();
            let metric = summarize(&key, &quantities);
            (key, metric)
        })
        .collect()
}

fn summarize(key: &ItemKey, quantities: &[f64]) -> HistoricalMetric {
    let mean_qty = mean(quantities);
    let std_qty = sample_std(quantities).unwrap_or(0.0);
    let non_zero_weeks = quantities.iter().filter(|quantity| **quantity > 0.0).count() as u32;
    let total_weeks = quantities.len() as u32;
    let [avg_4w, avg_12w, avg_24w, avg_52w] =
        ROLLING_WINDOWS.map(|window| trailing_mean(quantities, window));

    HistoricalMetric {
        customer: key.customer.clone(),
        item_code: key.item_code.clone(),
        item_name: key.item_name.clone(),
        avg_4w,
        avg_12w,
        avg_24w,
        avg_52w,
        mean_qty,
        std_qty,
        cv: coefficient_of_variation(std_qty, mean_qty),
        density: if total_weeks == 0 {
            0.0
        } else {
            f64::from(non_zero_weeks) / f64::from(total_weeks)
        },
        non_zero_weeks,
        total_weeks,
    }
}

fn compute_buying_cycles(observations: &[Observation]) -> HashMap<PairKey, BuyingCycle> {
    let mut purchase_weeks: BTreeMap<PairKey, Vec<NaiveDate>> = BTreeMap::new();
    for observation in observations.iter().filter(|observation| is_purchase(observation)) {
        purchase_weeks.entry(observation.pair_key()).or_default().push(observation.week_end_date);
    }

    purchase_weeks
        .into_iter()
        .filter_map(|(key, mut weeks)| {
            if weeks.len() <= 1 {
                return None;
            }
            weeks.sort();
            let gaps: Vec<f64> = weeks
                .windows(2)
                .map(|pair| (pair[1] - pair[0]).num_days() as f64 / 7.0)
                .collect();
            let cycle = BuyingCycle {
                customer: key.customer.clone(),
                item_code: key.item_code.clone(),
                avg_cycle_weeks: mean(&gaps),
            };
            Some((key, cycle))
        })
        .collect()
}

fn compute_purchase_counts(observations: &[Observation]) -> HashMap<PairKey, PurchaseCount> {
    let mut counts: HashMap<PairKey, PurchaseCount> = HashMap::new();
    for observation in observations.iter().filter(|observation| is_purchase(observation)) {
        counts
            .entry(observation.pair_key())
            .or_insert_with(|| PurchaseCount {
                customer: observation.customer.clone(),
                item_code: observation.item_code.clone(),
                buy_count: 0,
            })
            .buy_count += 1;
    }
    counts
}

fn is_purchase(observation: &Observation) -> bool {
    finite_or_zero(observation.quantity) > 0.0
}

/// Mean of the last `window` values, or of all values when fewer exist.
fn trailing_mean(values: &[f64], window: usize) -> f64 {
    let start = values.len().saturating_sub(window);
    mean(&values[start..])
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values);
    let sum_sq: f64 = values.iter().map(|value| (value - mean).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

fn coefficient_of_variation(std_qty: f64, mean_qty: f64) -> f64 {
    if mean_qty > 0.0 {
        finite_or_zero(std_qty / mean_qty)
    } else {
        0.0
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
