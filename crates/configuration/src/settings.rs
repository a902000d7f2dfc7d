use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::ConfigError;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub analytics: AnalyticsSettings,
    pub logging: LoggingSettings,
}

impl Settings {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analytics.validate()
    }
}

/// Parameters handed to the analytics engine.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Annual risk-free rate used by the Sharpe and Sortino ratios (0.05 = 5%).
    pub risk_free_rate: Decimal,
    /// Lookback window used when a request does not name one.
    pub default_period_days: u32,
    /// Benchmarks compared against when a request does not name any.
    pub default_benchmarks: Vec<String>,
    /// Trailing windows, in days, evaluated by the risk analysis.
    pub risk_horizons: Vec<u32>,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            risk_free_rate: Decimal::ZERO,
            default_period_days: 365,
            default_benchmarks: vec!["SP500".to_string(), "BTC".to_string()],
            risk_horizons: vec![30, 90, 365],
        }
    }
}

impl AnalyticsSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.risk_free_rate < Decimal::NEGATIVE_ONE || self.risk_free_rate > Decimal::ONE {
            return Err(ConfigError::ValidationError(format!(
                "analytics.risk_free_rate must be between -1 and 1, got {}",
                self.risk_free_rate
            )));
        }
        if self.default_period_days == 0 {
            return Err(ConfigError::ValidationError(
                "analytics.default_period_days must be greater than 0".to_string(),
            ));
        }
        if self.risk_horizons.is_empty() || self.risk_horizons.contains(&0) {
            return Err(ConfigError::ValidationError(
                "analytics.risk_horizons must be a non-empty list of positive day counts".to_string(),
            ));
        }
        Ok(())
    }
}

/// Output format of the stderr log layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Where and how log records are written.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive such as `info` or `analytics=debug`. `RUST_LOG` wins when set.
    pub level: String,
    pub format: LogFormat,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            directory: None,
        }
    }
}
