use analytics::{BenchmarkComparison, MetricsResult, RiskAnalysis};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use rust_decimal::Decimal;

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.to_vec());
    table
}

fn percent(value: Decimal) -> String {
    format!("{}%", value)
}

fn optional(value: Option<Decimal>, suffix: &str) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{}{}", v, suffix))
}

/// A two-column table of every portfolio metric, or the insufficiency message.
pub fn metrics_table(result: &MetricsResult) -> String {
    let Some(metrics) = result.metrics() else {
        return format!(
            "{} ({} data points in the last {} days)",
            result.message().unwrap_or_default(),
            result.data_points,
            result.period_days
        );
    };

    let mut table = new_table(&["Metric", "Value"]);
    let rows = [
        ("Total return", percent(metrics.total_return)),
        ("Annualized return", optional(metrics.annualized_return, "%")),
        ("Annualized volatility", percent(metrics.annualized_volatility)),
        ("Max drawdown", percent(metrics.max_drawdown)),
        ("Sharpe ratio", metrics.sharpe_ratio.to_string()),
        ("Sortino ratio", metrics.sortino_ratio.to_string()),
        ("Win rate", percent(metrics.win_rate)),
        ("Average period return", percent(metrics.avg_period_return)),
        ("Best period", percent(metrics.best_period)),
        ("Worst period", percent(metrics.worst_period)),
        ("Up / down periods", format!("{} / {}", metrics.positive_periods, metrics.negative_periods)),
        ("Periods per year", metrics.periods_per_year.to_string()),
        ("Data points", result.data_points.to_string()),
    ];
    for (name, value) in rows {
        table.add_row(vec![Cell::new(name), Cell::new(value)]);
    }
    format!("Portfolio metrics, last {} days\n{}", result.period_days, table)
}

/// One row per resolved benchmark, followed by the list the portfolio beat.
pub fn benchmarks_table(comparison: &BenchmarkComparison) -> String {
    let Some(portfolio) = &comparison.portfolio else {
        return comparison.message.clone().unwrap_or_default();
    };

    let mut table = new_table(&["Benchmark", "Return", "Portfolio", "Relative", "Volatility", "Alpha", "Beta"]);
    for entry in &comparison.comparisons {
        table.add_row(vec![
            Cell::new(format!("{} ({})", entry.benchmark_name, entry.symbol)),
            Cell::new(percent(entry.benchmark_return)),
            Cell::new(percent(entry.portfolio_return)),
            Cell::new(percent(entry.relative_performance)),
            Cell::new(percent(entry.benchmark_volatility)),
            Cell::new(optional(entry.alpha, "%")),
            Cell::new(optional(entry.beta, "")),
        ]);
    }

    let beaten = if comparison.outperforming.is_empty() {
        "none".to_string()
    } else {
        comparison.outperforming.join(", ")
    };
    format!(
        "Portfolio return {} over the last {} days\n{}\nOutperforming: {}",
        percent(portfolio.total_return),
        comparison.period_days,
        table,
        beaten
    )
}

/// One row per horizon plus the overall score.
pub fn risk_table(analysis: &RiskAnalysis) -> String {
    let mut table = new_table(&["Horizon", "Return", "Volatility", "Max drawdown", "Sharpe", "Data points"]);
    for horizon in &analysis.horizons {
        let label = format!("{}d", horizon.period_days);
        let row = match horizon.metrics() {
            Some(m) => vec![
                label,
                percent(m.total_return),
                percent(m.annualized_volatility),
                percent(m.max_drawdown),
                m.sharpe_ratio.to_string(),
                horizon.data_points.to_string(),
            ],
            None => vec![
                label,
                "insufficient data".to_string(),
                String::new(),
                String::new(),
                String::new(),
                horizon.data_points.to_string(),
            ],
        };
        table.add_row(row);
    }
    format!(
        "Risk as of {}\n{}\nRisk score: {}/100 ({})",
        analysis.as_of.format("%Y-%m-%d %H:%M UTC"),
        table,
        analysis.risk_score,
        risk_label(analysis.risk_level)
    )
}

fn risk_label(level: analytics::RiskLevel) -> &'static str {
    use analytics::RiskLevel::*;
    match level {
        VeryLow => "very low",
        Low => "low",
        Moderate => "moderate",
        High => "high",
        VeryHigh => "very high",
    }
}
