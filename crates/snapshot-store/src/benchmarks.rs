use crate::error::StoreError;
use crate::read_file;
use chrono::{DateTime, Utc};
use core_types::{in_trailing_window, BenchmarkSeries};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// Display name for the benchmark symbols the application knows about.
pub fn display_name(symbol: &str) -> Option<&'static str> {
    match symbol {
        "SP500" => Some("S&P 500"),
        "BTC" => Some("Bitcoin"),
        "ETH" => Some("Ethereum"),
        "NASDAQ" => Some("NASDAQ"),
        _ => None,
    }
}

/// An in-memory view of a benchmark file: a JSON array of series, one per symbol.
#[derive(Debug, Clone, Default)]
pub struct BenchmarkStore {
    series: HashMap<String, BenchmarkSeries>,
}

impl BenchmarkStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = read_file(path).await?;
        let store = Self::from_json(&contents)?;
        info!(path = %path.display(), benchmarks = store.len(), "Benchmark store loaded.");
        Ok(store)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let series: Vec<BenchmarkSeries> = serde_json::from_str(json)?;
        Ok(Self::from_series(series))
    }

    /// Indexes series by upper-cased symbol. A later series for the same symbol replaces an earlier one.
    pub fn from_series(series: Vec<BenchmarkSeries>) -> Self {
        let series = series
            .into_iter()
            .map(|mut s| {
                s.symbol = s.symbol.trim().to_uppercase();
                if s.name.trim().is_empty() {
                    s.name = display_name(&s.symbol).map_or_else(|| s.symbol.clone(), str::to_string);
                }
                s.points.sort_by_key(|p| p.timestamp);
                (s.symbol.clone(), s)
            })
            .collect();
        Self { series }
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Looks up each requested symbol and cuts its series to `[as_of - period_days, as_of]`.
    ///
    /// Symbols the store does not know are simply absent from the returned map.
    /// The map is keyed by the symbol exactly as requested.
    pub fn resolve<S: AsRef<str>>(
        &self,
        symbols: &[S],
        period_days: u32,
        as_of: DateTime<Utc>,
    ) -> HashMap<String, BenchmarkSeries> {
        let mut resolved = HashMap::with_capacity(symbols.len());
        for symbol in symbols {
            let requested: &str = symbol.as_ref();
            let Some(series) = self.series.get(&requested.trim().to_uppercase()) else {
                debug!(symbol = requested, "Benchmark symbol is unknown to the store.");
                continue;
            };
            let points = series
                .points
                .iter()
                .filter(|p| in_trailing_window(p.timestamp, period_days, as_of))
                .copied()
                .collect();
            resolved.insert(
                requested.to_string(),
                BenchmarkSeries::new(series.symbol.clone(), series.name.clone(), points),
            );
        }
        resolved
    }
}
