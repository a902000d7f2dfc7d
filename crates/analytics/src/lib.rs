//! # Folio Analytics Engine
//!
//! This crate turns a series of portfolio value snapshots into risk and
//! performance metrics: total and annualized return, volatility, Sharpe and
//! Sortino ratios, maximum drawdown, win rate, and comparisons against
//! benchmark series.
//!
//! ## Architectural Principles
//!
//! - **Pure Logic:** No I/O and no knowledge of where snapshots come from. It
//!   depends only on `core-types` and on `configuration` for its settings.
//! - **Stateless Calculation:** `AnalyticsEngine` holds immutable parameters
//!   only. Every call is a function of its inputs and may run on any thread.
//! - **Insufficient data is a result, not an error:** too little history yields
//!   an `insufficient_data` status that callers render as "come back later".
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: `compute_metrics`, `compare_benchmarks` and `assess_risk`.
//! - `classify_sufficiency`: the shared minimum-history predicate.
//! - `MetricsResult`, `BenchmarkComparison`, `RiskAnalysis`: the serializable outputs.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod benchmark;
pub mod engine;
pub mod error;
pub mod report;
pub mod returns;
pub mod risk;
pub mod sufficiency;

// Re-export the key components to create a clean, public-facing API.
pub use benchmark::calculate_alpha_beta;
pub use engine::{AnalyticsEngine, DEFAULT_RISK_HORIZONS};
pub use error::AnalyticsError;
pub use report::{
    AnalysisStatus, BenchmarkComparison, BenchmarkComparisonEntry, MetricsOutcome, MetricsResult, PortfolioMetrics,
    SeriesSummary,
};
pub use returns::{ReturnSeries, ValueSeries};
pub use risk::{risk_score, trailing_window, RiskAnalysis, RiskLevel};
pub use sufficiency::{classify_sufficiency, Sufficiency, MIN_SNAPSHOTS};
