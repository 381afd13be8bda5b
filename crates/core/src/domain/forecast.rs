use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use super::history::{ItemKey, PairKey};
use crate::errors::DomainError;

/// A forecast-table row for one customer-item-week.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastRow {
    pub customer: String,
    pub item_code: String,
    pub item_name: String,
    pub week_end_date: NaiveDate,
    pub predicted_quantity: f64,
    pub confidence: Confidence,
    pub demand_pattern: DemandPattern,
    pub data_split: DataSplit,
    /// Observed quantity; only known for weeks that already happened.
    pub actual_quantity: Option<f64>,
}

impl ForecastRow {
    pub fn pair_key(&self) -> PairKey {
        PairKey::new(&self.customer, &self.item_code)
    }

    pub fn item_key(&self) -> ItemKey {
        ItemKey::new(&self.customer, &self.item_code, &self.item_name)
    }
}

/// Forecast reliability label supplied by the forecasting pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Confidence {
    High,
    Low,
    Unknown,
}

impl Confidence {
    /// Case-insensitive; unrecognized labels become `Unknown`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "low" => Self::Low,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Low => "Low",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of historical demand for a customer-item pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum DemandPattern {
    Smooth,
    Intermittent,
    Lumpy,
    Sparse,
    Other(String),
}

impl DemandPattern {
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "smooth" => Self::Smooth,
            "intermittent" => Self::Intermittent,
            "lumpy" => Self::Lumpy,
            "sparse" => Self::Sparse,
            _ => Self::Other(trimmed.to_owned()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Smooth => "Smooth",
            Self::Intermittent => "Intermittent",
            Self::Lumpy => "Lumpy",
            Self::Sparse => "Sparse",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for DemandPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for DemandPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Provenance of a forecast row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DataSplit {
    /// Historical fit.
    Train,
    /// Historical holdout with known actuals.
    Test,
    /// Future week, no actuals yet.
    Forecast,
}

impl DataSplit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Train => "Train",
            Self::Test => "Test",
            Self::Forecast => "Forecast",
        }
    }
}

impl FromStr for DataSplit {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "train" => Ok(Self::Train),
            "test" => Ok(Self::Test),
            "forecast" => Ok(Self::Forecast),
            other => Err(DomainError::InvariantViolation(format!(
                "unsupported data split `{other}` (expected train|test|forecast)"
            ))),
        }
    }
}

impl fmt::Display for DataSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_parses_case_insensitively() {
        assert_eq!(Confidence::parse("High"), Confidence::High);
        assert_eq!(Confidence::parse(" low "), Confidence::Low);
        assert_eq!(Confidence::parse("medium"), Confidence::Unknown);
        assert_eq!(Confidence::parse(""), Confidence::Unknown);
    }

    #[test]
    fn demand_pattern_keeps_unknown_labels() {
        assert_eq!(DemandPattern::parse("smooth"), DemandPattern::Smooth);
        assert_eq!(DemandPattern::parse("Intermittent"), DemandPattern::Intermittent);
        assert_eq!(
            DemandPattern::parse("Lumpy/Sparse"),
            DemandPattern::Other("Lumpy/Sparse".to_owned())
        );
        assert_eq!(DemandPattern::parse("Lumpy/Sparse").label(), "Lumpy/Sparse");
    }

    #[test]
    fn demand_pattern_serializes_as_label() {
        let json = serde_json::to_string(&DemandPattern::Intermittent).expect("serialize");
        assert_eq!(json, "\"Intermittent\"");
    }

    #[test]
    fn data_split_rejects_unknown_values() {
        assert_eq!("Test".parse::<DataSplit>(), Ok(DataSplit::Test));
        assert_eq!(" forecast".parse::<DataSplit>(), Ok(DataSplit::Forecast));
        assert!("Validation".parse::<DataSplit>().is_err());
    }
}
