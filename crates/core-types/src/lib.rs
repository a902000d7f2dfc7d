//! # Folio Core Types
//!
//! The shared vocabulary of the workspace: portfolio snapshots, benchmark value
//! series and the portfolio-type enum. Every other crate depends on this one and
//! it depends on nothing inside the workspace.

pub mod enums;
pub mod error;
pub mod structs;
pub mod window;

// Re-export the core types to provide a clean public API.
pub use enums::PortfolioType;
pub use error::CoreError;
pub use structs::{BenchmarkSeries, Snapshot, ValuePoint};
pub use window::{in_trailing_window, window_start};
