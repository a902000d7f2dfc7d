//! # Folio Snapshot Store Crate
//!
//! This crate is the read side of the system's "archive": it loads recorded
//! portfolio snapshots and benchmark value histories from JSON files and
//! hands windowed slices of them to the analytics engine.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All file-format knowledge lives here. The rest of the
//!   application sees only `core-types` values.
//! - **Asynchronous I/O:** Files are read with `tokio::fs`, so several stores
//!   can be opened concurrently by the caller.
//! - **Read-only:** Stores are loaded once and never written back.
//!
//! ## Public API
//!
//! - `SnapshotStore`: Portfolio snapshots, filtered by portfolio type and window.
//! - `BenchmarkStore`: Benchmark series, resolved by symbol and window.
//! - `StoreError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod benchmarks;
pub mod error;
pub mod snapshots;

// Re-export the key components to create a clean, public-facing API.
pub use benchmarks::{display_name, BenchmarkStore};
pub use error::StoreError;
pub use snapshots::SnapshotStore;

use std::path::Path;

/// Reads a whole file, mapping a missing file to `StoreError::NotFound`.
pub(crate) async fn read_file(path: &Path) -> Result<String, StoreError> {
    tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StoreError::NotFound(path.to_path_buf()),
        _ => StoreError::Io(e),
    })
}
