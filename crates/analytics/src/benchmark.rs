use crate::engine::{
    ensure_period, insufficient_message, round, to_metric, AnalyticsEngine, SeriesStats, ZERO_VARIANCE_EPSILON,
};
use crate::error::AnalyticsError;
use crate::report::{
    BenchmarkComparison, BenchmarkComparisonEntry, SeriesSummary, PERCENT_PRECISION, RATIO_PRECISION,
};
use crate::returns::{ReturnSeries, ValueSeries};
use core_types::{BenchmarkSeries, Snapshot};
use std::collections::HashMap;
use tracing::{debug, info, warn};

impl AnalyticsEngine {
    /// Compares the portfolio's performance over a window with each requested benchmark.
    ///
    /// # Arguments
    ///
    /// * `snapshots` - The portfolio snapshots inside the window.
    /// * `period_days` - The length of that window.
    /// * `requested` - Benchmark symbols in the order the caller wants them reported.
    /// * `series_by_name` - Whatever the benchmark provider could resolve, keyed by symbol.
    ///
    /// Benchmarks that are missing from `series_by_name`, or whose series is too
    /// short or starts at zero, are left out of the result rather than failing it.
    pub fn compare_benchmarks<S: AsRef<str>>(
        &self,
        snapshots: &[Snapshot],
        period_days: u32,
        requested: &[S],
        series_by_name: &HashMap<String, BenchmarkSeries>,
    ) -> Result<BenchmarkComparison, AnalyticsError> {
        ensure_period(period_days)?;

        let portfolio_series = ValueSeries::from_snapshots(snapshots);
        let portfolio = match self.measure(&portfolio_series) {
            Ok(stats) => stats,
            Err(e) if e.is_insufficient_data() => {
                info!(period_days, reason = %e, "Insufficient portfolio data for a benchmark comparison.");
                return Ok(BenchmarkComparison::insufficient(period_days, insufficient_message(&e)));
            }
            Err(e) => return Err(e),
        };
        let portfolio_metrics = self.build_metrics(&portfolio)?;
        let portfolio_summary = SeriesSummary::from_metrics(&portfolio_metrics, portfolio.data_points);

        let mut comparisons = Vec::with_capacity(requested.len());
        for symbol in requested {
            let symbol: &str = symbol.as_ref();
            let Some(benchmark) = series_by_name.get(symbol) else {
                debug!(symbol, "Benchmark has no provider data, omitting.");
                continue;
            };

            match self.compare_one(&portfolio, &portfolio_summary, benchmark) {
                Ok(entry) => comparisons.push(entry),
                Err(e) if e.is_insufficient_data() => {
                    debug!(symbol, reason = %e, "Benchmark series is unusable, omitting.");
                }
                Err(e) => {
                    warn!(symbol, error = %e, "Benchmark metrics could not be represented, omitting.");
                }
            }
        }

        info!(
            period_days,
            requested = requested.len(),
            resolved = comparisons.len(),
            "Benchmark comparison calculated."
        );
        Ok(BenchmarkComparison::calculated(period_days, portfolio_summary, comparisons))
    }

    fn compare_one(
        &self,
        portfolio: &SeriesStats,
        portfolio_summary: &SeriesSummary,
        benchmark: &BenchmarkSeries,
    ) -> Result<BenchmarkComparisonEntry, AnalyticsError> {
        let series = ValueSeries::from_points(benchmark.points.iter().copied());
        let stats = self.measure(&series)?;
        let metrics = self.build_metrics(&stats)?;

        let capm = calculate_alpha_beta(
            &portfolio.returns,
            &stats.returns,
            portfolio.periods_per_year,
            self.risk_free_rate(),
        );
        let (alpha, beta) = match capm {
            Some((alpha, beta)) => (
                Some(to_metric("alpha", alpha * 100.0, PERCENT_PRECISION)?),
                Some(to_metric("beta", beta, RATIO_PRECISION)?),
            ),
            None => (None, None),
        };

        // Both returns are already rounded, so the difference is exact at display precision.
        let relative_performance = round(portfolio_summary.total_return - metrics.total_return, PERCENT_PRECISION);

        let benchmark_name = match benchmark.name.trim() {
            "" => benchmark.symbol.clone(),
            name => name.to_string(),
        };

        Ok(BenchmarkComparisonEntry {
            benchmark_name,
            symbol: benchmark.symbol.clone(),
            benchmark_return: metrics.total_return,
            portfolio_return: portfolio_summary.total_return,
            relative_performance,
            benchmark_volatility: metrics.annualized_volatility,
            benchmark_sharpe_ratio: metrics.sharpe_ratio,
            benchmark_max_drawdown: metrics.max_drawdown,
            data_points: stats.data_points,
            alpha,
            beta,
        })
    }
}

/// CAPM alpha (annualized, as a fraction) and beta of the portfolio against a benchmark.
///
/// Uses population covariance. Returns `None` unless both series hold the same
/// number of returns (at least two) and the benchmark actually varies.
pub fn calculate_alpha_beta(
    portfolio: &ReturnSeries,
    benchmark: &ReturnSeries,
    periods_per_year: f64,
    risk_free_rate: f64,
) -> Option<(f64, f64)> {
    let (p, b) = (portfolio.values(), benchmark.values());
    if p.len() != b.len() || p.len() < 2 || periods_per_year <= 0.0 {
        return None;
    }

    let n = p.len() as f64;
    let p_mean = portfolio.mean();
    let b_mean = benchmark.mean();

    let covariance = p.iter().zip(b).map(|(pi, bi)| (pi - p_mean) * (bi - b_mean)).sum::<f64>() / n;
    let variance = b.iter().map(|bi| (bi - b_mean).powi(2)).sum::<f64>() / n;
    if variance < ZERO_VARIANCE_EPSILON * ZERO_VARIANCE_EPSILON {
        return None;
    }

    let beta = covariance / variance;
    let periodic_risk_free = risk_free_rate / periods_per_year;
    let alpha = (p_mean - (periodic_risk_free + beta * (b_mean - periodic_risk_free))) * periods_per_year;

    Some((alpha, beta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::AnalysisStatus;
    use crate::returns::series_from_pairs;
    use approx::assert_relative_eq;
    use chrono::{DateTime, TimeZone, Utc};
    use core_types::{PortfolioType, ValuePoint};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()
    }

    fn portfolio() -> Vec<Snapshot> {
        [dec!(10000), dec!(10500), dec!(9800)]
            .iter()
            .enumerate()
            .map(|(i, v)| Snapshot::new(day(i as u32 + 1), PortfolioType::Combined, *v))
            .collect()
    }

    fn benchmark(symbol: &str, name: &str, values: &[Decimal]) -> BenchmarkSeries {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| ValuePoint::new(day(i as u32 + 1), *v))
            .collect();
        BenchmarkSeries::new(symbol, name, points)
    }

    #[test]
    fn omits_unresolved_benchmarks() {
        let mut resolved = HashMap::new();
        resolved.insert("SP500".to_string(), benchmark("SP500", "S&P 500", &[dec!(100), dec!(101), dec!(102)]));

        let comparison = AnalyticsEngine::new()
            .compare_benchmarks(&portfolio(), 365, &["SP500", "BTC"], &resolved)
            .unwrap();

        assert_eq!(comparison.status, AnalysisStatus::Calculated);
        assert_eq!(comparison.comparisons.len(), 1);
        let entry = &comparison.comparisons[0];
        assert_eq!(entry.symbol, "SP500");
        assert_eq!(entry.benchmark_return, dec!(2.00));
        assert_eq!(entry.portfolio_return, dec!(-2.00));
        assert_eq!(entry.relative_performance, dec!(-4.00));
        assert!(comparison.outperforming.is_empty());
    }

    #[test]
    fn keeps_request_order() {
        let mut resolved = HashMap::new();
        resolved.insert("BTC".to_string(), benchmark("BTC", "Bitcoin", &[dec!(100), dec!(80), dec!(90)]));
        resolved.insert("SP500".to_string(), benchmark("SP500", "S&P 500", &[dec!(100), dec!(101), dec!(102)]));

        let comparison = AnalyticsEngine::new()
            .compare_benchmarks(&portfolio(), 365, &["SP500", "BTC"], &resolved)
            .unwrap();

        let symbols: Vec<_> = comparison.comparisons.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["SP500", "BTC"]);
        assert_eq!(comparison.outperforming, vec!["Bitcoin".to_string()]);
    }

    #[test]
    fn unnamed_benchmark_is_reported_by_symbol() {
        let mut resolved = HashMap::new();
        resolved.insert("GOLD".to_string(), benchmark("GOLD", "", &[dec!(100), dec!(95), dec!(90)]));

        let comparison = AnalyticsEngine::new()
            .compare_benchmarks(&portfolio(), 365, &["GOLD"], &resolved)
            .unwrap();
        assert_eq!(comparison.comparisons[0].benchmark_name, "GOLD");
        assert_eq!(comparison.outperforming, vec!["GOLD".to_string()]);
    }

    #[test]
    fn unusable_benchmark_series_are_omitted() {
        let mut resolved = HashMap::new();
        resolved.insert("ETH".to_string(), benchmark("ETH", "Ethereum", &[dec!(0), dec!(10)]));
        resolved.insert("NASDAQ".to_string(), benchmark("NASDAQ", "NASDAQ", &[dec!(100)]));

        let comparison = AnalyticsEngine::new()
            .compare_benchmarks(&portfolio(), 365, &["ETH", "NASDAQ"], &resolved)
            .unwrap();
        assert_eq!(comparison.status, AnalysisStatus::Calculated);
        assert!(comparison.comparisons.is_empty());
    }

    #[test]
    fn insufficient_portfolio_yields_empty_comparison() {
        let mut resolved = HashMap::new();
        resolved.insert("SP500".to_string(), benchmark("SP500", "S&P 500", &[dec!(100), dec!(101)]));

        let comparison = AnalyticsEngine::new()
            .compare_benchmarks(&portfolio()[..1], 365, &["SP500"], &resolved)
            .unwrap();
        assert_eq!(comparison.status, AnalysisStatus::InsufficientData);
        assert!(comparison.comparisons.is_empty());
        assert!(comparison.portfolio.is_none());
        assert!(comparison.message.is_some());
    }

    #[test]
    fn alpha_beta_of_a_leveraged_copy() {
        let bench = series_from_pairs(&[
            (day(1), dec!(100)),
            (day(2), dec!(102)),
            (day(3), dec!(99)),
            (day(4), dec!(103)),
        ])
        .returns();
        // A portfolio whose every return is exactly twice the benchmark's.
        let doubled: Vec<_> = bench.values().to_vec();
        let mut value = dec!(1000);
        let mut pairs = vec![(day(1), value)];
        for (i, r) in doubled.iter().enumerate() {
            let factor = Decimal::try_from(1.0 + 2.0 * r).unwrap();
            value *= factor;
            pairs.push((day(i as u32 + 2), value));
        }
        let port = series_from_pairs(&pairs).returns();

        let (alpha, beta) = calculate_alpha_beta(&port, &bench, 365.25, 0.0).unwrap();
        assert_relative_eq!(beta, 2.0, epsilon = 1e-6);
        assert_relative_eq!(alpha, (port.mean() - 2.0 * bench.mean()) * 365.25, epsilon = 1e-6);
    }

    #[test]
    fn alpha_beta_requires_aligned_series() {
        let a = series_from_pairs(&[(day(1), dec!(1)), (day(2), dec!(2)), (day(3), dec!(3))]).returns();
        let b = series_from_pairs(&[(day(1), dec!(1)), (day(2), dec!(2))]).returns();
        assert!(calculate_alpha_beta(&a, &b, 365.25, 0.0).is_none());

        let flat = series_from_pairs(&[(day(1), dec!(5)), (day(2), dec!(5)), (day(3), dec!(5))]).returns();
        assert!(calculate_alpha_beta(&a, &flat, 365.25, 0.0).is_none());
    }
}
