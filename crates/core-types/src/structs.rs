use crate::enums::PortfolioType;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A timestamped recording of a portfolio's total value.
///
/// Snapshots are produced by the snapshot store on a schedule or on demand and
/// are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(alias = "date", alias = "snapshot_date")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub portfolio_type: PortfolioType,
    pub total_value: Decimal,
}

impl Snapshot {
    pub fn new(timestamp: DateTime<Utc>, portfolio_type: PortfolioType, total_value: Decimal) -> Self {
        Self {
            timestamp,
            portfolio_type,
            total_value,
        }
    }

    /// Rejects snapshots whose value is negative. A zero value is legal.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.total_value < Decimal::ZERO {
            return Err(CoreError::InvalidInput(
                "total_value".to_string(),
                format!("{} at {} is negative", self.total_value, self.timestamp),
            ));
        }
        Ok(())
    }

    /// The (timestamp, value) view used by the analytics calculations.
    pub fn point(&self) -> ValuePoint {
        ValuePoint {
            timestamp: self.timestamp,
            value: self.total_value,
        }
    }
}

/// A single observation of any value series (portfolio or benchmark).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuePoint {
    #[serde(alias = "date")]
    pub timestamp: DateTime<Utc>,
    pub value: Decimal,
}

impl ValuePoint {
    pub fn new(timestamp: DateTime<Utc>, value: Decimal) -> Self {
        Self { timestamp, value }
    }
}

impl From<&Snapshot> for ValuePoint {
    fn from(snapshot: &Snapshot) -> Self {
        snapshot.point()
    }
}

/// The value history of an external reference asset or index, e.g. `SP500`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkSeries {
    /// The symbol callers request the benchmark by.
    pub symbol: String,
    /// Human-readable name shown next to the comparison. Filled in by the
    /// provider when a record leaves it empty.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub points: Vec<ValuePoint>,
}

impl BenchmarkSeries {
    pub fn new(symbol: impl Into<String>, name: impl Into<String>, points: Vec<ValuePoint>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            points,
        }
    }
}
