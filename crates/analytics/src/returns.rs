//! Cleaning of raw value series and derivation of their periodic returns.

use chrono::{Duration, Utc};
use core_types::{Snapshot, ValuePoint};
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Days per year used by every annualization. Averages in leap years.
pub const DAYS_PER_YEAR: f64 = 365.25;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Length of a positive `Duration` in fractional days.
pub fn duration_days(duration: Duration) -> f64 {
    (duration.num_seconds() as f64 + f64::from(duration.subsec_nanos()) * 1e-9) / SECONDS_PER_DAY
}

/// A value series with invalid records removed, in ascending timestamp order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSeries {
    points: Vec<ValuePoint>,
}

impl ValueSeries {
    /// Drops negative values and sorts by timestamp. The sort is stable, so points
    /// sharing a timestamp keep their input order.
    pub fn from_points(points: impl IntoIterator<Item = ValuePoint>) -> Self {
        let mut kept: Vec<ValuePoint> = points
            .into_iter()
            .filter(|point| {
                if point.value < Decimal::ZERO {
                    warn!(timestamp = %point.timestamp, value = %point.value, "Skipping record with negative value.");
                    return false;
                }
                true
            })
            .collect();

        if !kept.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
            debug!(points = kept.len(), "Series was not in timestamp order, sorting.");
            kept.sort_by_key(|point| point.timestamp);
        }

        Self { points: kept }
    }

    pub fn from_snapshots(snapshots: &[Snapshot]) -> Self {
        Self::from_points(
            snapshots
                .iter()
                .filter(|snapshot| match snapshot.validate() {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(error = %e, "Skipping invalid snapshot.");
                        false
                    }
                })
                .map(Snapshot::point),
        )
    }

    pub fn points(&self) -> &[ValuePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&ValuePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&ValuePoint> {
        self.points.last()
    }

    /// Time covered from the first to the last point, in fractional days.
    pub fn span_days(&self) -> f64 {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) if last.timestamp > first.timestamp => {
                duration_days(last.timestamp - first.timestamp)
            }
            _ => 0.0,
        }
    }

    /// Simple returns between consecutive points.
    ///
    /// An interval is skipped when its duration is not positive (duplicate
    /// timestamps) or when the earlier value is zero.
    pub fn returns(&self) -> ReturnSeries {
        let mut series = ReturnSeries::default();

        for w in self.points.windows(2) {
            let (prev, curr) = (&w[0], &w[1]);
            let interval = curr.timestamp - prev.timestamp;

            if interval <= Duration::zero() {
                debug!(timestamp = %curr.timestamp, "Skipping interval with a duplicate timestamp.");
                continue;
            }
            if prev.value.is_zero() {
                debug!(timestamp = %prev.timestamp, "Skipping interval that starts at a zero value.");
                continue;
            }

            let period_return = (curr.value - prev.value)
                .checked_div(prev.value)
                .and_then(|r| r.to_f64());
            match period_return {
                Some(r) => {
                    series.returns.push(r);
                    series.intervals.push(interval);
                }
                None => warn!(timestamp = %curr.timestamp, "Skipping interval whose return is not representable."),
            }
        }

        series
    }
}

/// Periodic simple returns together with the length of each interval.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReturnSeries {
    returns: Vec<f64>,
    intervals: Vec<Duration>,
}

impl ReturnSeries {
    pub fn values(&self) -> &[f64] {
        &self.returns
    }

    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    pub fn mean(&self) -> f64 {
        if self.returns.is_empty() {
            return 0.0;
        }
        self.returns.iter().sum::<f64>() / self.returns.len() as f64
    }

    /// Sample standard deviation (divides by `n - 1`). Zero when fewer than two returns exist.
    pub fn sample_std_dev(&self) -> f64 {
        let n = self.returns.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self.returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        variance.sqrt()
    }

    /// Root mean square of the negative returns, taken over all `n` returns.
    pub fn downside_deviation(&self) -> f64 {
        if self.returns.is_empty() {
            return 0.0;
        }
        let downside = self.returns.iter().filter(|r| **r < 0.0).map(|r| r.powi(2)).sum::<f64>();
        (downside / self.returns.len() as f64).sqrt()
    }

    pub fn positive_count(&self) -> usize {
        self.returns.iter().filter(|r| **r > 0.0).count()
    }

    pub fn negative_count(&self) -> usize {
        self.returns.iter().filter(|r| **r < 0.0).count()
    }

    pub fn best(&self) -> Option<f64> {
        self.returns.iter().copied().reduce(f64::max)
    }

    pub fn worst(&self) -> Option<f64> {
        self.returns.iter().copied().reduce(f64::min)
    }

    /// Median spacing between the measured points.
    pub fn median_interval(&self) -> Option<Duration> {
        if self.intervals.is_empty() {
            return None;
        }
        let mut sorted = self.intervals.clone();
        sorted.sort();
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2)
        } else {
            Some(sorted[mid])
        }
    }

    /// Annualization factor implied by the median sampling interval.
    pub fn periods_per_year(&self) -> Option<f64> {
        self.median_interval().map(|interval| DAYS_PER_YEAR / duration_days(interval))
    }
}

/// Convenience used by tests and callers holding bare `(timestamp, value)` pairs.
pub fn series_from_pairs(pairs: &[(chrono::DateTime<Utc>, Decimal)]) -> ValueSeries {
    ValueSeries::from_points(pairs.iter().map(|&(timestamp, value)| ValuePoint::new(timestamp, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{DateTime, TimeZone};
    use rust_decimal_macros::dec;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn computes_simple_returns() {
        let series = series_from_pairs(&[(day(1), dec!(10000)), (day(2), dec!(10500)), (day(3), dec!(9800))]);
        let returns = series.returns();
        assert_eq!(returns.len(), 2);
        assert_relative_eq!(returns.values()[0], 0.05, epsilon = 1e-12);
        assert_relative_eq!(returns.values()[1], -0.066_666_666_666_667, epsilon = 1e-9);
        assert_eq!(returns.positive_count(), 1);
        assert_eq!(returns.negative_count(), 1);
    }

    #[test]
    fn sorts_out_of_order_input() {
        let series = series_from_pairs(&[(day(3), dec!(9800)), (day(1), dec!(10000)), (day(2), dec!(10500))]);
        assert_eq!(series.first().map(|p| p.value), Some(dec!(10000)));
        assert_eq!(series.last().map(|p| p.value), Some(dec!(9800)));
    }

    #[test]
    fn skips_zero_prior_values_and_duplicate_timestamps() {
        let series = series_from_pairs(&[
            (day(1), dec!(100)),
            (day(1), dec!(120)),
            (day(2), dec!(0)),
            (day(3), dec!(50)),
            (day(4), dec!(55)),
        ]);
        let returns = series.returns();
        // 100->120 has no duration, 0->50 has no base.
        assert_eq!(returns.len(), 2);
        assert_relative_eq!(returns.values()[0], -1.0);
        assert_relative_eq!(returns.values()[1], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn drops_negative_values() {
        let series = series_from_pairs(&[(day(1), dec!(100)), (day(2), dec!(-5)), (day(3), dec!(110))]);
        assert_eq!(series.len(), 2);
        assert_relative_eq!(series.returns().values()[0], 0.1, epsilon = 1e-12);
    }

    #[test]
    fn sample_std_dev_uses_n_minus_one() {
        let series = series_from_pairs(&[
            (day(1), dec!(100)),
            (day(2), dec!(110)),
            (day(3), dec!(99)),
            (day(4), dec!(108.9)),
        ]);
        // Returns are 0.1, -0.1, 0.1: mean 1/30, sample variance 0.04/3.
        let returns = series.returns();
        assert_relative_eq!(returns.sample_std_dev(), (0.04f64 / 3.0).sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn periods_per_year_follows_median_spacing() {
        let weekly = series_from_pairs(&[(day(1), dec!(1)), (day(8), dec!(2)), (day(15), dec!(3)), (day(16), dec!(4))]);
        let returns = weekly.returns();
        assert_eq!(returns.median_interval(), Some(Duration::days(7)));
        assert_relative_eq!(returns.periods_per_year().unwrap(), DAYS_PER_YEAR / 7.0);

        let even = series_from_pairs(&[(day(1), dec!(1)), (day(2), dec!(2)), (day(5), dec!(3))]);
        assert_eq!(even.returns().median_interval(), Some(Duration::days(2)));
    }

    #[test]
    fn span_covers_first_to_last() {
        let series = series_from_pairs(&[(day(1), dec!(1)), (day(11), dec!(2))]);
        assert_relative_eq!(series.span_days(), 10.0);
        assert_eq!(ValueSeries::default().span_days(), 0.0);
    }
}
