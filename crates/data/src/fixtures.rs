//! Deterministic demo snapshot used by `reorder seed`, `reorder smoke` and
//! tests across the workspace.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use reorder_core::domain::{Confidence, DataSplit, DemandPattern, ForecastRow, Observation};
use thiserror::Error;

use crate::loader::{FORECAST_COLUMNS, HISTORY_COLUMNS};
use crate::Snapshot;

pub const HISTORY_FILE_NAME: &str = "training_data_weekly.csv";
pub const FORECAST_FILE_NAME: &str = "merged_predictions.csv";

/// Week with Test rows (actuals known) and overlapping Forecast rows.
pub const DEMO_TEST_WEEK: &str = "2025-01-26";
/// Week with Forecast rows only.
pub const DEMO_FORECAST_WEEK: &str = "2025-02-02";

const HISTORY_WEEKS: i64 = 26;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("could not prepare `{path}`: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("could not write `{path}`: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedPaths {
    pub history: PathBuf,
    pub forecast: PathBuf,
}

struct DemoItem {
    customer: &'static str,
    item_code: &'static str,
    item_name: &'static str,
    pattern: &'static str,
    /// Weekly quantity by history week index, oldest first.
    quantity: fn(i64) -> f64,
    test_prediction: Option<(f64, f64, &'static str)>,
    forecast_prediction: Option<(f64, &'static str)>,
}

const DEMO_ITEMS: [DemoItem; 7] = [
    DemoItem {
        customer: "Corner Market",
        item_code: "1001",
        item_name: "Whole Milk 1L",
        pattern: "Smooth",
        quantity: |week| 10.0 + (week % 5) as f64,
        test_prediction: Some((11.6, 13.0, "High")),
        forecast_prediction: Some((12.2, "High")),
    },
    DemoItem {
        customer: "Corner Market",
        item_code: "1002",
        item_name: "Sourdough Loaf",
        pattern: "Intermittent",
        quantity: |week| if week % 3 == 0 { 6.0 } else { 0.0 },
        test_prediction: None,
        forecast_prediction: Some((2.4, "Low")),
    },
    DemoItem {
        customer: "Harbor Cafe",
        item_code: "2001",
        item_name: "Espresso Beans 1kg",
        pattern: "Lumpy",
        quantity: |week| if week % 6 == 0 { 20.0 + (week % 4) as f64 * 10.0 } else { 0.0 },
        test_prediction: Some((7.5, 0.0, "Low")),
        forecast_prediction: Some((9.1, "Low")),
    },
    DemoItem {
        customer: "Harbor Cafe",
        item_code: "2002",
        item_name: "Oat Milk 1L",
        pattern: "Smooth",
        quantity: |_| 8.0,
        test_prediction: Some((8.0, 8.0, "High")),
        forecast_prediction: Some((8.3, "High")),
    },
    DemoItem {
        customer: "Sunrise Deli",
        item_code: "3001",
        item_name: "Rye Bread",
        pattern: "Smooth",
        quantity: |week| 5.0 + (week % 3) as f64,
        test_prediction: Some((6.1, 5.0, "High")),
        forecast_prediction: Some((6.4, "High")),
    },
    DemoItem {
        customer: "Sunrise Deli",
        item_code: "3002",
        item_name: "Dill Pickles Jar",
        pattern: "Intermittent",
        quantity: |week| if week % 8 == 0 { 3.0 } else { 0.0 },
        test_prediction: None,
        forecast_prediction: Some((0.6, "Low")),
    },
    DemoItem {
        customer: "Sunrise Deli",
        item_code: "3003",
        item_name: "Stone Ground Mustard",
        pattern: "Lumpy",
        quantity: |_| 0.0,
        test_prediction: None,
        forecast_prediction: Some((2.0, "High")),
    },
];

fn demo_week(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap_or_default()
}

/// History plus forecast for three customers. Deterministic: repeated calls
/// return identical rows.
pub fn demo_snapshot() -> Snapshot {
    let test_week = demo_week(DEMO_TEST_WEEK);
    let forecast_week = demo_week(DEMO_FORECAST_WEEK);
    let first_history_week = test_week - Duration::weeks(HISTORY_WEEKS);

    let mut history = Vec::new();
    let mut forecast = Vec::new();

    for item in &DEMO_ITEMS {
        for week in 0..HISTORY_WEEKS {
            history.push(Observation {
                customer: item.customer.to_owned(),
                item_code: item.item_code.to_owned(),
                item_name: item.item_name.to_owned(),
                week_end_date: first_history_week + Duration::weeks(week),
                quantity: (item.quantity)(week),
            });
        }

        let row = |week_end_date, predicted, confidence: &str, split, actual| ForecastRow {
            customer: item.customer.to_owned(),
            item_code: item.item_code.to_owned(),
            item_name: item.item_name.to_owned(),
            week_end_date,
            predicted_quantity: predicted,
            confidence: Confidence::parse(confidence),
            demand_pattern: DemandPattern::parse(item.pattern),
            data_split: split,
            actual_quantity: actual,
        };

        if let Some((predicted, actual, confidence)) = item.test_prediction {
            forecast.push(row(test_week, predicted, confidence, DataSplit::Test, Some(actual)));
            // superseded by the Test row above
            forecast.push(row(test_week, predicted * 1.5, confidence, DataSplit::Forecast, None));
        } else if let Some((predicted, confidence)) = item.forecast_prediction {
            forecast.push(row(test_week, predicted, confidence, DataSplit::Forecast, None));
        }
        if let Some((predicted, confidence)) = item.forecast_prediction {
            forecast.push(row(forecast_week, predicted, confidence, DataSplit::Forecast, None));
        }
    }

    Snapshot { history: history.into(), forecast: forecast.into() }
}

/// Write the demo snapshot into `out_dir`, creating it when needed.
pub fn write_demo_csv(out_dir: &Path) -> Result<SeedPaths, FixtureError> {
    fs::create_dir_all(out_dir)
        .map_err(|source| FixtureError::Io { path: out_dir.to_path_buf(), source })?;

    let snapshot = demo_snapshot();
    let paths = SeedPaths {
        history: out_dir.join(HISTORY_FILE_NAME),
        forecast: out_dir.join(FORECAST_FILE_NAME),
    };

    write_history(&paths.history, snapshot.history.rows())?;
    write_forecast(&paths.forecast, snapshot.forecast.rows())?;
    Ok(paths)
}

fn write_history(path: &Path, rows: &[Observation]) -> Result<(), FixtureError> {
    let csv_error = |source| FixtureError::Csv { path: path.to_path_buf(), source };
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;

    writer.write_record(HISTORY_COLUMNS).map_err(csv_error)?;
    for row in rows {
        writer
            .write_record([
                row.customer.clone(),
                row.item_code.clone(),
                row.item_name.clone(),
                row.week_end_date.to_string(),
                row.quantity.to_string(),
            ])
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|source| FixtureError::Io { path: path.to_path_buf(), source })
}

fn write_forecast(path: &Path, rows: &[ForecastRow]) -> Result<(), FixtureError> {
    let csv_error = |source| FixtureError::Csv { path: path.to_path_buf(), source };
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;

    writer.write_record(FORECAST_COLUMNS).map_err(csv_error)?;
    for row in rows {
        writer
            .write_record([
                row.customer.clone(),
                row.item_code.clone(),
                row.item_name.clone(),
                row.week_end_date.to_string(),
                row.predicted_quantity.to_string(),
                row.confidence.to_string(),
                row.demand_pattern.to_string(),
                row.data_split.to_string(),
                row.actual_quantity.map(|actual| actual.to_string()).unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|source| FixtureError::Io { path: path.to_path_buf(), source })
}
