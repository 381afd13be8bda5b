//! CSV snapshot loaders for the history and forecast tables.
//!
//! A missing file or missing header yields `Dataset::Unavailable` so the
//! service keeps running and reports the problem per request. A malformed row
//! is a hard `LoadError` carrying its line number.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use reorder_core::domain::{
    Confidence, DataSplit, Dataset, DemandPattern, ForecastRow, Observation,
};
use reorder_core::weeks;
use thiserror::Error;
use tracing::{error, info, warn};

pub const CUSTOMER_COLUMN: &str = "CustomerName";
pub const ITEM_CODE_COLUMN: &str = "ItemCode";
pub const ITEM_NAME_COLUMN: &str = "ItemName";
pub const DATE_COLUMN: &str = "TrxDate";
pub const QUANTITY_COLUMN: &str = "TotalQuantity";
pub const PREDICTED_COLUMN: &str = "Predicted";
pub const CONFIDENCE_COLUMN: &str = "Confidence";
pub const PATTERN_COLUMN: &str = "Demand_Pattern";
pub const SPLIT_COLUMN: &str = "DataSplit";

pub const HISTORY_COLUMNS: [&str; 5] =
    [CUSTOMER_COLUMN, ITEM_CODE_COLUMN, ITEM_NAME_COLUMN, DATE_COLUMN, QUANTITY_COLUMN];

pub const FORECAST_COLUMNS: [&str; 9] = [
    CUSTOMER_COLUMN,
    ITEM_CODE_COLUMN,
    ITEM_NAME_COLUMN,
    DATE_COLUMN,
    PREDICTED_COLUMN,
    CONFIDENCE_COLUMN,
    PATTERN_COLUMN,
    SPLIT_COLUMN,
    QUANTITY_COLUMN,
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not open `{path}`: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("{source_name}: malformed csv: {source}")]
    Csv { source_name: String, source: csv::Error },
    #[error("{source_name} line {line}: invalid {column} value `{value}`")]
    InvalidValue { source_name: String, line: u64, column: &'static str, value: String },
}

/// Load the weekly purchase history.
pub fn load_history(path: &Path) -> Result<Dataset<Observation>, LoadError> {
    match open(path, "history")? {
        Some(file) => history_from_reader(file, &path.display().to_string()),
        None => Ok(Dataset::unavailable(format!("history file not found: {}", path.display()))),
    }
}

/// Load the merged forecast table.
pub fn load_forecast(path: &Path) -> Result<Dataset<ForecastRow>, LoadError> {
    match open(path, "forecast")? {
        Some(file) => forecast_from_reader(file, &path.display().to_string()),
        None => Ok(Dataset::unavailable("Prediction data not available")),
    }
}

pub fn history_from_reader<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<Dataset<Observation>, LoadError> {
    let mut reader = csv_reader(reader);
    let resolved = Columns::resolve(&mut reader, &HISTORY_COLUMNS, "training data", source_name)?;
    let columns = match resolved {
        Ok(columns) => columns,
        Err(unavailable) => return Ok(unavailable),
    };

    let mut observations = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| csv_error(source_name, source))?;
        let row = RowReader { record: &record, columns: &columns, source_name };

        observations.push(Observation {
            customer: row.text(CUSTOMER_COLUMN),
            item_code: row.text(ITEM_CODE_COLUMN),
            item_name: row.text(ITEM_NAME_COLUMN),
            week_end_date: row.week(DATE_COLUMN)?,
            quantity: row.number(QUANTITY_COLUMN)?.unwrap_or(0.0),
        });
    }

    info!(
        event_name = "data.history.loaded",
        source = source_name,
        rows = observations.len(),
        "history snapshot loaded"
    );
    Ok(Dataset::Loaded(observations))
}

pub fn forecast_from_reader<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<Dataset<ForecastRow>, LoadError> {
    let mut reader = csv_reader(reader);
    let resolved = Columns::resolve(&mut reader, &FORECAST_COLUMNS, "predictions", source_name)?;
    let columns = match resolved {
        Ok(columns) => columns,
        Err(unavailable) => return Ok(unavailable),
    };

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| csv_error(source_name, source))?;
        let row = RowReader { record: &record, columns: &columns, source_name };

        let split_label = row.raw(SPLIT_COLUMN);
        let data_split = split_label
            .parse::<DataSplit>()
            .map_err(|_| row.invalid(SPLIT_COLUMN, split_label))?;

        rows.push(ForecastRow {
            customer: row.text(CUSTOMER_COLUMN),
            item_code: row.text(ITEM_CODE_COLUMN),
            item_name: row.text(ITEM_NAME_COLUMN),
            week_end_date: row.week(DATE_COLUMN)?,
            predicted_quantity: row.number(PREDICTED_COLUMN)?.unwrap_or(0.0),
            confidence: Confidence::parse(row.raw(CONFIDENCE_COLUMN)),
            demand_pattern: DemandPattern::parse(row.raw(PATTERN_COLUMN)),
            data_split,
            actual_quantity: row.number(QUANTITY_COLUMN)?,
        });
    }

    standardize_item_names(&mut rows);

    info!(
        event_name = "data.forecast.loaded",
        source = source_name,
        rows = rows.len(),
        "forecast snapshot loaded"
    );
    Ok(Dataset::Loaded(rows))
}

/// Rewrite every item name to the first one seen for its item code, so a
/// relabelled product does not split its metrics join.
pub fn standardize_item_names(rows: &mut [ForecastRow]) {
    let mut first_names: HashMap<String, String> = HashMap::new();
    for row in rows.iter() {
        first_names.entry(row.item_code.clone()).or_insert_with(|| row.item_name.clone());
    }

    for row in rows.iter_mut() {
        if let Some(name) = first_names.get(&row.item_code) {
            if *name != row.item_name {
                row.item_name.clone_from(name);
            }
        }
    }
}

fn open(path: &Path, table: &'static str) -> Result<Option<File>, LoadError> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            error!(
                event_name = "data.file.missing",
                table,
                path = %path.display(),
                "snapshot file not found; serving without it"
            );
            Ok(None)
        }
        Err(source) => Err(LoadError::Open { path: path.to_path_buf(), source }),
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    ReaderBuilder::new().has_headers(true).trim(Trim::All).flexible(true).from_reader(reader)
}

fn csv_error(source_name: &str, source: csv::Error) -> LoadError {
    LoadError::Csv { source_name: source_name.to_owned(), source }
}

/// Header positions of the required columns.
struct Columns {
    positions: HashMap<&'static str, usize>,
}

impl Columns {
    /// Outer error is a malformed header; inner `Err` is an unavailable
    /// dataset naming the missing columns.
    fn resolve<R: Read, T>(
        reader: &mut csv::Reader<R>,
        required: &[&'static str],
        table_label: &str,
        source_name: &str,
    ) -> Result<Result<Self, Dataset<T>>, LoadError> {
        let headers = reader.headers().map_err(|source| csv_error(source_name, source))?.clone();

        let mut positions = HashMap::new();
        let mut missing = Vec::new();
        for column in required {
            match headers.iter().position(|header| header == *column) {
                Some(index) => {
                    positions.insert(*column, index);
                }
                None => missing.push(*column),
            }
        }

        if missing.is_empty() {
            return Ok(Ok(Self { positions }));
        }

        let reason = format!("Missing required columns in {table_label}: {missing:?}");
        warn!(
            event_name = "data.columns.missing",
            source = source_name,
            missing = ?missing,
            "required columns missing; dataset unavailable"
        );
        Ok(Err(Dataset::unavailable(reason)))
    }
}

struct RowReader<'a> {
    record: &'a StringRecord,
    columns: &'a Columns,
    source_name: &'a str,
}

impl<'a> RowReader<'a> {
    fn raw(&self, column: &'static str) -> &'a str {
        self.columns
            .positions
            .get(column)
            .and_then(|index| self.record.get(*index))
            .unwrap_or_default()
    }

    fn text(&self, column: &'static str) -> String {
        self.raw(column).to_owned()
    }

    fn week(&self, column: &'static str) -> Result<NaiveDate, LoadError> {
        let value = self.raw(column);
        weeks::align(value).map_err(|_| self.invalid(column, value))
    }

    /// Empty cells are `None`.
    fn number(&self, column: &'static str) -> Result<Option<f64>, LoadError> {
        let value = self.raw(column);
        if value.is_empty() {
            return Ok(None);
        }
        value.parse::<f64>().map(Some).map_err(|_| self.invalid(column, value))
    }

    fn invalid(&self, column: &'static str, value: &str) -> LoadError {
        LoadError::InvalidValue {
            source_name: self.source_name.to_owned(),
            line: self.record.position().map_or(0, |position| position.line()),
            column,
            value: value.to_owned(),
        }
    }
}
