use crate::error::StoreError;
use crate::read_file;
use chrono::{DateTime, Utc};
use core_types::{in_trailing_window, PortfolioType, Snapshot};
use std::path::Path;
use tracing::{debug, info};

/// An in-memory view of a snapshot file.
///
/// The file holds a JSON array of snapshot records. Records are kept sorted by
/// timestamp; equal timestamps keep their file order.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    snapshots: Vec<Snapshot>,
}

impl SnapshotStore {
    /// Loads every snapshot from the JSON file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let contents = read_file(path).await?;
        let store = Self::from_json(&contents)?;
        info!(path = %path.display(), snapshots = store.len(), "Snapshot store loaded.");
        Ok(store)
    }

    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let snapshots: Vec<Snapshot> = serde_json::from_str(json)?;
        Ok(Self::from_snapshots(snapshots))
    }

    pub fn from_snapshots(mut snapshots: Vec<Snapshot>) -> Self {
        snapshots.sort_by_key(|s| s.timestamp);
        Self { snapshots }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Every snapshot of one portfolio type, oldest first.
    pub fn all(&self, portfolio_type: PortfolioType) -> Vec<Snapshot> {
        self.snapshots
            .iter()
            .filter(|s| s.portfolio_type == portfolio_type)
            .cloned()
            .collect()
    }

    /// The snapshots of one portfolio type inside `[as_of - period_days, as_of]`, oldest first.
    pub fn history(&self, portfolio_type: PortfolioType, period_days: u32, as_of: DateTime<Utc>) -> Vec<Snapshot> {
        let window: Vec<Snapshot> = self
            .snapshots
            .iter()
            .filter(|s| s.portfolio_type == portfolio_type && in_trailing_window(s.timestamp, period_days, as_of))
            .cloned()
            .collect();
        debug!(%portfolio_type, period_days, %as_of, found = window.len(), "Snapshot window selected.");
        window
    }

    /// Timestamp of the most recent snapshot of one portfolio type.
    pub fn latest(&self, portfolio_type: PortfolioType) -> Option<DateTime<Utc>> {
        self.snapshots
            .iter()
            .rev()
            .find(|s| s.portfolio_type == portfolio_type)
            .map(|s| s.timestamp)
    }
}
