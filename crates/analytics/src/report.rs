use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Decimal places kept for metrics expressed as percentages.
pub const PERCENT_PRECISION: u32 = 2;
/// Decimal places kept for dimensionless ratios (Sharpe, Sortino, beta).
pub const RATIO_PRECISION: u32 = 3;
/// Decimal places kept for the average periodic return, which is usually tiny.
pub const AVERAGE_RETURN_PRECISION: u32 = 4;

/// Whether a calculation produced numbers or needs more history first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Calculated,
    InsufficientData,
}

/// Risk and performance statistics of one value series over one window.
///
/// All percentages are in percent (`-6.67` means -6.67%). `max_drawdown` is
/// reported as a non-positive number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    // I. Return
    pub total_return: Decimal,
    pub annualized_return: Option<Decimal>, // None when the window is shorter than a day
    pub avg_period_return: Decimal,
    pub best_period: Decimal,
    pub worst_period: Decimal,

    // II. Risk
    pub volatility: Decimal,
    pub annualized_volatility: Decimal,
    pub max_drawdown: Decimal,
    pub sharpe_ratio: Decimal,
    pub sortino_ratio: Decimal,

    // III. Period statistics
    pub win_rate: Decimal,
    pub positive_periods: usize,
    pub negative_periods: usize,
    pub periods_per_year: Decimal,
    #[serde(with = "humantime_serde")]
    pub sampling_interval: Duration,
}

/// The two shapes a metrics calculation can take. Serialized with a `status`
/// tag so exactly one of `metrics` or `message` is ever present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricsOutcome {
    Calculated { metrics: PortfolioMetrics },
    InsufficientData { message: String },
}

/// Output of `AnalyticsEngine::compute_metrics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsResult {
    pub period_days: u32,
    /// Usable snapshots in the window, after invalid records were dropped.
    pub data_points: usize,
    #[serde(flatten)]
    pub outcome: MetricsOutcome,
}

impl MetricsResult {
    pub fn calculated(period_days: u32, data_points: usize, metrics: PortfolioMetrics) -> Self {
        Self {
            period_days,
            data_points,
            outcome: MetricsOutcome::Calculated { metrics },
        }
    }

    pub fn insufficient(period_days: u32, data_points: usize, message: impl Into<String>) -> Self {
        Self {
            period_days,
            data_points,
            outcome: MetricsOutcome::InsufficientData {
                message: message.into(),
            },
        }
    }

    pub fn status(&self) -> AnalysisStatus {
        match self.outcome {
            MetricsOutcome::Calculated { .. } => AnalysisStatus::Calculated,
            MetricsOutcome::InsufficientData { .. } => AnalysisStatus::InsufficientData,
        }
    }

    pub fn metrics(&self) -> Option<&PortfolioMetrics> {
        match &self.outcome {
            MetricsOutcome::Calculated { metrics } => Some(metrics),
            MetricsOutcome::InsufficientData { .. } => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match &self.outcome {
            MetricsOutcome::Calculated { .. } => None,
            MetricsOutcome::InsufficientData { message } => Some(message),
        }
    }
}

/// The headline numbers of the portfolio shown above a benchmark comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub total_return: Decimal,
    pub annualized_volatility: Decimal,
    pub sharpe_ratio: Decimal,
    pub max_drawdown: Decimal,
    pub data_points: usize,
}

impl SeriesSummary {
    pub fn from_metrics(metrics: &PortfolioMetrics, data_points: usize) -> Self {
        Self {
            total_return: metrics.total_return,
            annualized_volatility: metrics.annualized_volatility,
            sharpe_ratio: metrics.sharpe_ratio,
            max_drawdown: metrics.max_drawdown,
            data_points,
        }
    }
}

/// The portfolio measured against a single benchmark over the same window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparisonEntry {
    pub benchmark_name: String,
    pub symbol: String,
    pub benchmark_return: Decimal,
    pub portfolio_return: Decimal,
    /// `portfolio_return - benchmark_return`, in percentage points.
    pub relative_performance: Decimal,
    pub benchmark_volatility: Decimal,
    pub benchmark_sharpe_ratio: Decimal,
    pub benchmark_max_drawdown: Decimal,
    pub data_points: usize,
    /// Annualized CAPM alpha in percent. Requires return series of equal length.
    pub alpha: Option<Decimal>,
    pub beta: Option<Decimal>,
}

/// Output of `AnalyticsEngine::compare_benchmarks`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkComparison {
    pub status: AnalysisStatus,
    pub period_days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub portfolio: Option<SeriesSummary>,
    /// One entry per resolvable benchmark, in request order.
    pub comparisons: Vec<BenchmarkComparisonEntry>,
    /// Names of the benchmarks the portfolio beat.
    pub outperforming: Vec<String>,
}

impl BenchmarkComparison {
    pub fn calculated(period_days: u32, portfolio: SeriesSummary, comparisons: Vec<BenchmarkComparisonEntry>) -> Self {
        let outperforming = comparisons
            .iter()
            .filter(|entry| entry.benchmark_return < portfolio.total_return)
            .map(|entry| entry.benchmark_name.clone())
            .collect();

        Self {
            status: AnalysisStatus::Calculated,
            period_days,
            message: None,
            portfolio: Some(portfolio),
            comparisons,
            outperforming,
        }
    }

    pub fn insufficient(period_days: u32, message: impl Into<String>) -> Self {
        Self {
            status: AnalysisStatus::InsufficientData,
            period_days,
            message: Some(message.into()),
            portfolio: None,
            comparisons: Vec::new(),
            outperforming: Vec::new(),
        }
    }
}
