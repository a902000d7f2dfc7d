use crate::engine::AnalyticsEngine;
use crate::error::AnalyticsError;
use crate::report::{MetricsResult, PortfolioMetrics};
use chrono::{DateTime, Utc};
use core_types::{in_trailing_window, Snapshot};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Score assigned when no metrics are available to judge.
pub const NEUTRAL_RISK_SCORE: u8 = 50;

/// Coarse label for a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            75.. => RiskLevel::VeryHigh,
            60..=74 => RiskLevel::High,
            40..=59 => RiskLevel::Moderate,
            25..=39 => RiskLevel::Low,
            _ => RiskLevel::VeryLow,
        }
    }
}

/// Metrics over several trailing horizons plus an overall risk judgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    pub as_of: DateTime<Utc>,
    /// One result per configured horizon, shortest first.
    pub horizons: Vec<MetricsResult>,
    /// 1 (calm) to 100 (very risky), judged on the longest horizon.
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

/// The snapshots of `history` that fall inside `[as_of - period_days, as_of]`.
pub fn trailing_window(history: &[Snapshot], period_days: u32, as_of: DateTime<Utc>) -> Vec<Snapshot> {
    history
        .iter()
        .filter(|snapshot| in_trailing_window(snapshot.timestamp, period_days, as_of))
        .cloned()
        .collect()
}

/// Scores volatility, drawdown and Sharpe ratio into a single 1..=100 number.
pub fn risk_score(metrics: Option<&PortfolioMetrics>) -> u8 {
    let Some(metrics) = metrics else {
        return NEUTRAL_RISK_SCORE;
    };

    let mut score = i32::from(NEUTRAL_RISK_SCORE);

    let volatility = metrics.annualized_volatility;
    if volatility > dec!(40) {
        score += 20;
    } else if volatility > dec!(25) {
        score += 10;
    } else if volatility < dec!(15) {
        score -= 10;
    }

    let drawdown = metrics.max_drawdown.abs();
    if drawdown > dec!(30) {
        score += 15;
    } else if drawdown > dec!(20) {
        score += 8;
    } else if drawdown < dec!(10) {
        score -= 5;
    }

    let sharpe = metrics.sharpe_ratio;
    if sharpe < dec!(0) {
        score += 15;
    } else if sharpe < dec!(0.5) {
        score += 5;
    } else if sharpe > dec!(1.5) {
        score -= 10;
    }

    score.clamp(1, 100) as u8
}

impl AnalyticsEngine {
    /// Evaluates every configured horizon of `history` as of a given instant.
    ///
    /// Unlike `compute_metrics`, this takes the full history and windows it
    /// itself, once per horizon.
    pub fn assess_risk(&self, history: &[Snapshot], as_of: DateTime<Utc>) -> Result<RiskAnalysis, AnalyticsError> {
        let mut periods = self.risk_horizons().to_vec();
        periods.sort_unstable();
        periods.dedup();
        let Some(&longest) = periods.last() else {
            return Err(AnalyticsError::InvalidInput("no risk horizons configured".to_string()));
        };

        let horizons = periods
            .iter()
            .map(|&period_days| self.compute_metrics(&trailing_window(history, period_days, as_of), period_days))
            .collect::<Result<Vec<_>, _>>()?;

        let judged = horizons
            .iter()
            .find(|result| result.period_days == longest)
            .and_then(MetricsResult::metrics);
        let risk_score = risk_score(judged);
        let risk_level = RiskLevel::from_score(risk_score);

        info!(%as_of, risk_score, ?risk_level, "Risk analysis calculated.");
        Ok(RiskAnalysis {
            as_of,
            horizons,
            risk_score,
            risk_level,
        })
    }
}
