use serde::{Deserialize, Serialize};

/// Fewest snapshots from which a single return, and therefore any metric, can be measured.
pub const MIN_SNAPSHOTS: usize = 2;

/// Whether a series has enough observations to be analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sufficiency {
    Sufficient,
    Insufficient,
}

impl Sufficiency {
    pub fn is_sufficient(self) -> bool {
        self == Sufficiency::Sufficient
    }
}

/// The single threshold shared by the metrics, benchmark and risk calculations.
pub fn classify_sufficiency(snapshot_count: usize) -> Sufficiency {
    if snapshot_count >= MIN_SNAPSHOTS {
        Sufficiency::Sufficient
    } else {
        Sufficiency::Insufficient
    }
}
