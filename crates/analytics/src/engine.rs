use crate::error::AnalyticsError;
use crate::report::{
    MetricsResult, PortfolioMetrics, AVERAGE_RETURN_PRECISION, PERCENT_PRECISION, RATIO_PRECISION,
};
use crate::returns::{ReturnSeries, ValueSeries, DAYS_PER_YEAR};
use crate::sufficiency::{classify_sufficiency, MIN_SNAPSHOTS};
use chrono::Duration;
use configuration::AnalyticsSettings;
use core_types::Snapshot;
use rust_decimal::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};

/// Trailing windows, in days, evaluated by `assess_risk` unless configured otherwise.
pub const DEFAULT_RISK_HORIZONS: [u32; 3] = [30, 90, 365];

/// Deviations below this are treated as a zero-variance series.
pub(crate) const ZERO_VARIANCE_EPSILON: f64 = 1e-12;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// A stateless calculator for deriving risk and performance metrics from
/// portfolio value snapshots.
///
/// The engine holds only immutable parameters, performs no I/O and can be
/// shared freely between threads.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    /// Annual risk-free rate as a fraction (0.05 = 5%).
    risk_free_rate: f64,
    risk_horizons: Vec<u32>,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            risk_horizons: DEFAULT_RISK_HORIZONS.to_vec(),
        }
    }
}

/// Unrounded intermediate results for one value series.
#[derive(Debug, Clone)]
pub(crate) struct SeriesStats {
    pub data_points: usize,
    /// Percent.
    pub total_return: Decimal,
    /// Percent, non-positive.
    pub max_drawdown: Decimal,
    pub returns: ReturnSeries,
    pub periods_per_year: f64,
    pub sampling_interval: Duration,
    pub span_days: f64,
}

impl AnalyticsEngine {
    /// An engine with a zero risk-free rate and the default risk horizons.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the engine from the `[analytics]` section of the settings.
    pub fn from_settings(settings: &AnalyticsSettings) -> Result<Self, AnalyticsError> {
        settings
            .validate()
            .map_err(|e| AnalyticsError::InvalidInput(e.to_string()))?;
        let risk_free_rate = settings.risk_free_rate.to_f64().ok_or_else(|| {
            AnalyticsError::InvalidInput(format!("risk_free_rate {} is not representable", settings.risk_free_rate))
        })?;

        Ok(Self {
            risk_free_rate,
            risk_horizons: settings.risk_horizons.clone(),
        })
    }

    pub fn with_risk_free_rate(mut self, risk_free_rate: f64) -> Self {
        self.risk_free_rate = risk_free_rate;
        self
    }

    pub fn with_risk_horizons(mut self, risk_horizons: Vec<u32>) -> Self {
        self.risk_horizons = risk_horizons;
        self
    }

    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    pub fn risk_horizons(&self) -> &[u32] {
        &self.risk_horizons
    }

    /// Computes the risk and performance metrics of a snapshot window.
    ///
    /// # Arguments
    ///
    /// * `snapshots` - The portfolio snapshots inside the requested trailing window.
    ///   Unsorted input is sorted; negative values are dropped.
    /// * `period_days` - The length of that window. Must be positive.
    ///
    /// # Returns
    ///
    /// `insufficient_data` when fewer than two usable snapshots exist, no interval
    /// between them can be measured, or the first value is zero.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero `period_days`. `Calculation` when a metric is
    /// too large for a `Decimal` (about 7.9e28), e.g. a window growing from
    /// `1e-22` to `1e10`, whose total return exceeds that bound.
    pub fn compute_metrics(&self, snapshots: &[Snapshot], period_days: u32) -> Result<MetricsResult, AnalyticsError> {
        ensure_period(period_days)?;
        let series = ValueSeries::from_snapshots(snapshots);

        match self.measure(&series) {
            Ok(stats) => {
                let metrics = self.build_metrics(&stats)?;
                info!(
                    period_days,
                    data_points = stats.data_points,
                    total_return = %metrics.total_return,
                    sharpe_ratio = %metrics.sharpe_ratio,
                    "Portfolio metrics calculated."
                );
                Ok(MetricsResult::calculated(period_days, stats.data_points, metrics))
            }
            Err(e) if e.is_insufficient_data() => {
                info!(period_days, data_points = series.len(), reason = %e, "Insufficient data for portfolio metrics.");
                Ok(MetricsResult::insufficient(period_days, series.len(), insufficient_message(&e)))
            }
            Err(e) => Err(e),
        }
    }

    /// Runs every unrounded calculation the reports are built from.
    pub(crate) fn measure(&self, series: &ValueSeries) -> Result<SeriesStats, AnalyticsError> {
        if !classify_sufficiency(series.len()).is_sufficient() {
            return Err(AnalyticsError::NotEnoughData(format!(
                "at least {} snapshots are required, found {}",
                MIN_SNAPSHOTS,
                series.len()
            )));
        }

        let total_return = self.calculate_total_return(series)?;
        let max_drawdown = self.calculate_drawdown(series);

        let returns = series.returns();
        let (Some(sampling_interval), Some(periods_per_year)) = (returns.median_interval(), returns.periods_per_year())
        else {
            return Err(AnalyticsError::NotEnoughData(
                "no measurable interval between snapshots".to_string(),
            ));
        };
        debug!(returns = returns.len(), periods_per_year, "Return series derived.");

        Ok(SeriesStats {
            data_points: series.len(),
            total_return,
            max_drawdown,
            returns,
            periods_per_year,
            sampling_interval,
            span_days: series.span_days(),
        })
    }

    /// `(v_last - v_first) / v_first`, in percent.
    fn calculate_total_return(&self, series: &ValueSeries) -> Result<Decimal, AnalyticsError> {
        let (Some(first), Some(last)) = (series.first(), series.last()) else {
            return Err(AnalyticsError::NotEnoughData("the series is empty".to_string()));
        };
        if first.value.is_zero() {
            return Err(AnalyticsError::DivisionByZero("total_return".to_string()));
        }

        (last.value - first.value)
            .checked_div(first.value)
            .and_then(|r| r.checked_mul(HUNDRED))
            .ok_or_else(|| AnalyticsError::Calculation("total_return overflowed".to_string()))
    }

    /// Largest decline from a running peak, as a non-positive percentage.
    fn calculate_drawdown(&self, series: &ValueSeries) -> Decimal {
        let mut max_drawdown = Decimal::ZERO;

        let Some(first) = series.first() else {
            return max_drawdown;
        };
        let mut peak = first.value;

        for point in series.points() {
            if point.value > peak {
                peak = point.value;
            } else if peak > Decimal::ZERO {
                let drawdown = (peak - point.value) / peak;
                if drawdown > max_drawdown {
                    max_drawdown = drawdown;
                }
            }
        }

        if max_drawdown.is_zero() {
            Decimal::ZERO
        } else {
            -(max_drawdown * HUNDRED)
        }
    }

    /// Annualized excess return per unit of annualized deviation. Zero when the
    /// deviation is zero.
    fn calculate_ratio(&self, mean_return: f64, deviation: f64, periods_per_year: f64) -> f64 {
        if deviation < ZERO_VARIANCE_EPSILON {
            return 0.0;
        }
        (mean_return * periods_per_year - self.risk_free_rate) / (deviation * periods_per_year.sqrt())
    }

    /// Rounds every statistic to its display precision.
    pub(crate) fn build_metrics(&self, stats: &SeriesStats) -> Result<PortfolioMetrics, AnalyticsError> {
        let returns = &stats.returns;
        let periods_per_year = stats.periods_per_year;
        let mean_return = returns.mean();
        let std_dev = returns.sample_std_dev();

        let sharpe_ratio = self.calculate_ratio(mean_return, std_dev, periods_per_year);
        let sortino_ratio = self.calculate_ratio(mean_return, returns.downside_deviation(), periods_per_year);

        let win_rate = Decimal::from(returns.positive_count()) / Decimal::from(returns.len()) * HUNDRED;

        let sampling_interval = stats
            .sampling_interval
            .to_std()
            .map_err(|e| AnalyticsError::Calculation(format!("sampling_interval: {}", e)))?;

        Ok(PortfolioMetrics {
            total_return: round(stats.total_return, PERCENT_PRECISION),
            annualized_return: annualize(stats.total_return, stats.span_days),
            avg_period_return: to_metric("avg_period_return", mean_return * 100.0, AVERAGE_RETURN_PRECISION)?,
            best_period: to_metric("best_period", returns.best().unwrap_or_default() * 100.0, PERCENT_PRECISION)?,
            worst_period: to_metric("worst_period", returns.worst().unwrap_or_default() * 100.0, PERCENT_PRECISION)?,
            volatility: to_metric("volatility", std_dev * 100.0, PERCENT_PRECISION)?,
            annualized_volatility: to_metric(
                "annualized_volatility",
                std_dev * periods_per_year.sqrt() * 100.0,
                PERCENT_PRECISION,
            )?,
            max_drawdown: round(stats.max_drawdown, PERCENT_PRECISION),
            sharpe_ratio: to_metric("sharpe_ratio", sharpe_ratio, RATIO_PRECISION)?,
            sortino_ratio: to_metric("sortino_ratio", sortino_ratio, RATIO_PRECISION)?,
            win_rate: round(win_rate, PERCENT_PRECISION),
            positive_periods: returns.positive_count(),
            negative_periods: returns.negative_count(),
            periods_per_year: to_metric("periods_per_year", periods_per_year, PERCENT_PRECISION)?,
            sampling_interval,
        })
    }
}

pub(crate) fn ensure_period(period_days: u32) -> Result<(), AnalyticsError> {
    if period_days == 0 {
        return Err(AnalyticsError::InvalidInput("period_days must be greater than 0".to_string()));
    }
    Ok(())
}

/// The user-facing explanation attached to an `insufficient_data` result.
pub(crate) fn insufficient_message(error: &AnalyticsError) -> String {
    match error {
        AnalyticsError::NotEnoughData(reason) => {
            format!("Not enough portfolio history yet: {}.", reason)
        }
        AnalyticsError::DivisionByZero(metric) => {
            format!("The first value in the window is zero, so {} cannot be measured yet.", metric)
        }
        other => other.to_string(),
    }
}

/// Half-away-from-zero rounding that never yields a negative zero.
pub(crate) fn round(value: Decimal, dp: u32) -> Decimal {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() { rounded.abs() } else { rounded }
}

/// Converts a float statistic to a rounded Decimal, failing on NaN, infinity or overflow.
pub(crate) fn to_metric(name: &str, value: f64, dp: u32) -> Result<Decimal, AnalyticsError> {
    if !value.is_finite() {
        return Err(AnalyticsError::Calculation(format!("{} is not finite", name)));
    }
    Decimal::from_f64(value)
        .map(|d| round(d, dp))
        .ok_or_else(|| AnalyticsError::Calculation(format!("{} = {} is out of range", name, value)))
}

/// Compounds a total return (percent) over its span to a yearly rate (percent).
fn annualize(total_return: Decimal, span_days: f64) -> Option<Decimal> {
    if span_days < 1.0 {
        return None;
    }
    let growth = 1.0 + total_return.to_f64()? / 100.0;
    let annualized = (growth.max(0.0).powf(DAYS_PER_YEAR / span_days) - 1.0) * 100.0;
    to_metric("annualized_return", annualized, PERCENT_PRECISION).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::AnalysisStatus;
    use chrono::{DateTime, TimeZone, Utc};
    use core_types::PortfolioType;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()
    }

    fn snapshots(values: &[(u32, Decimal)]) -> Vec<Snapshot> {
        values
            .iter()
            .map(|&(d, v)| Snapshot::new(day(d), PortfolioType::Combined, v))
            .collect()
    }

    #[test]
    fn three_day_scenario() {
        let engine = AnalyticsEngine::new();
        let result = engine
            .compute_metrics(&snapshots(&[(1, dec!(10000)), (2, dec!(10500)), (3, dec!(9800))]), 365)
            .unwrap();

        assert_eq!(result.status(), AnalysisStatus::Calculated);
        assert_eq!(result.data_points, 3);
        let metrics = result.metrics().unwrap();
        assert_eq!(metrics.total_return, dec!(-2.00));
        assert_eq!(metrics.max_drawdown, dec!(-6.67));
        assert_eq!(metrics.win_rate, dec!(50.00));
        assert_eq!(metrics.best_period, dec!(5.00));
        assert_eq!(metrics.worst_period, dec!(-6.67));
        assert_eq!(metrics.periods_per_year, dec!(365.25));
        assert_eq!(metrics.positive_periods, 1);
        assert_eq!(metrics.negative_periods, 1);
        assert_eq!(metrics.avg_period_return, dec!(-0.8333));
        assert_eq!(metrics.volatility, dec!(8.25));
        assert_eq!(metrics.annualized_volatility, dec!(157.66));
        assert_eq!(metrics.sharpe_ratio, dec!(-1.931));
        assert_eq!(metrics.sortino_ratio, dec!(-3.378));
        assert_eq!(metrics.annualized_return, Some(dec!(-97.50)));
        assert_eq!(metrics.sampling_interval, std::time::Duration::from_secs(86_400));
    }

    #[test]
    fn weekly_snapshots_annualize_by_weeks() {
        let result = AnalyticsEngine::new()
            .compute_metrics(&snapshots(&[(1, dec!(1000)), (8, dec!(1100)), (15, dec!(1045))]), 365)
            .unwrap();

        let metrics = result.metrics().unwrap();
        assert_eq!(metrics.periods_per_year, dec!(52.18));
        assert_eq!(metrics.sampling_interval, std::time::Duration::from_secs(7 * 86_400));
        assert_eq!(metrics.total_return, dec!(4.50));
        assert_eq!(metrics.avg_period_return, dec!(2.5000));
        assert_eq!(metrics.volatility, dec!(10.61));
        assert_eq!(metrics.annualized_volatility, dec!(76.62));
        assert_eq!(metrics.sharpe_ratio, dec!(1.703));
        assert_eq!(metrics.sortino_ratio, dec!(5.108));
        assert_eq!(metrics.annualized_return, Some(dec!(215.30)));
    }

    #[test]
    fn single_snapshot_is_insufficient() {
        let result = AnalyticsEngine::new()
            .compute_metrics(&snapshots(&[(1, dec!(10000))]), 365)
            .unwrap();
        assert_eq!(result.status(), AnalysisStatus::InsufficientData);
        assert!(result.metrics().is_none());
        assert!(result.message().unwrap().contains("at least 2"));
    }

    #[test]
    fn zero_first_value_is_insufficient() {
        let result = AnalyticsEngine::new()
            .compute_metrics(&snapshots(&[(1, dec!(0)), (2, dec!(100))]), 365)
            .unwrap();
        assert_eq!(result.status(), AnalysisStatus::InsufficientData);
        assert!(result.message().unwrap().contains("total_return"));
    }

    #[test]
    fn duplicate_timestamps_only_is_insufficient() {
        let result = AnalyticsEngine::new()
            .compute_metrics(&snapshots(&[(1, dec!(100)), (1, dec!(110))]), 30)
            .unwrap();
        assert_eq!(result.status(), AnalysisStatus::InsufficientData);
        assert_eq!(result.data_points, 2);
    }

    #[test]
    fn negative_snapshots_do_not_count_towards_sufficiency() {
        let result = AnalyticsEngine::new()
            .compute_metrics(&snapshots(&[(1, dec!(100)), (2, dec!(-1))]), 30)
            .unwrap();
        assert_eq!(result.status(), AnalysisStatus::InsufficientData);
        assert_eq!(result.data_points, 1);
    }

    #[test]
    fn zero_variance_series_has_zero_sharpe() {
        // Identical returns every day.
        let result = AnalyticsEngine::new()
            .compute_metrics(&snapshots(&[(1, dec!(100)), (2, dec!(110)), (3, dec!(121))]), 30)
            .unwrap();
        let metrics = result.metrics().unwrap();
        assert_eq!(metrics.sharpe_ratio, Decimal::ZERO);
        assert_eq!(metrics.sortino_ratio, Decimal::ZERO);
        assert_eq!(metrics.max_drawdown, Decimal::ZERO);
        assert_eq!(metrics.win_rate, dec!(100.00));
    }

    #[test]
    fn flat_series_never_wins() {
        let result = AnalyticsEngine::new()
            .compute_metrics(&snapshots(&[(1, dec!(100)), (2, dec!(100)), (3, dec!(100))]), 30)
            .unwrap();
        let metrics = result.metrics().unwrap();
        assert_eq!(metrics.win_rate, dec!(0.00));
        assert_eq!(metrics.total_return, dec!(0.00));
        assert_eq!(metrics.annualized_volatility, dec!(0.00));
    }

    #[test]
    fn risk_free_rate_lowers_sharpe() {
        let data = snapshots(&[(1, dec!(100)), (2, dec!(103)), (3, dec!(101)), (4, dec!(106))]);
        let plain = AnalyticsEngine::new().compute_metrics(&data, 30).unwrap();
        let with_rate = AnalyticsEngine::new()
            .with_risk_free_rate(0.05)
            .compute_metrics(&data, 30)
            .unwrap();
        assert!(with_rate.metrics().unwrap().sharpe_ratio < plain.metrics().unwrap().sharpe_ratio);
    }

    #[test]
    fn unrepresentable_total_return_is_an_error() {
        let result = AnalyticsEngine::new()
            .compute_metrics(&snapshots(&[(1, dec!(0.0000000000000000000001)), (2, dec!(10000000000))]), 30);
        assert!(matches!(result, Err(AnalyticsError::Calculation(_))));
    }

    #[test]
    fn zero_period_is_rejected() {
        let result = AnalyticsEngine::new().compute_metrics(&snapshots(&[(1, dec!(1)), (2, dec!(2))]), 0);
        assert!(matches!(result, Err(AnalyticsError::InvalidInput(_))));
    }

    #[test]
    fn annualized_return_needs_a_full_day() {
        assert_eq!(annualize(dec!(10), 0.5), None);
        assert_eq!(annualize(dec!(10), DAYS_PER_YEAR), Some(dec!(10.00)));
        assert_eq!(annualize(dec!(-100), 30.0), Some(dec!(-100.00)));
    }

    #[test]
    fn rounding_is_half_away_from_zero_without_negative_zero() {
        assert_eq!(round(dec!(2.345), 2), dec!(2.35));
        assert_eq!(round(dec!(-2.345), 2), dec!(-2.35));
        assert!(!round(dec!(-0.001), 2).is_sign_negative());
    }

    #[test]
    fn from_settings_applies_risk_free_rate() {
        let settings = AnalyticsSettings {
            risk_free_rate: dec!(0.05),
            risk_horizons: vec![7, 30],
            ..AnalyticsSettings::default()
        };
        let engine = AnalyticsEngine::from_settings(&settings).unwrap();
        assert!((engine.risk_free_rate() - 0.05).abs() < 1e-12);
        assert_eq!(engine.risk_horizons(), &[7, 30]);
    }
}
