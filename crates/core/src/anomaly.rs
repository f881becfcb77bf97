use std::fmt;

use serde::{Deserialize, Serialize};

/// Structural irregularity tolerated during normalization. Anomalies
/// annotate a best-effort result; they never abort a call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "span_id", rename_all = "kebab-case")]
pub enum Anomaly {
    MultipleRoots,
    DanglingParent(String),
    CycleDetected,
    NegativeDuration(String),
    OrphanSubtree(String),
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultipleRoots => write!(f, "multiple-roots"),
            Self::DanglingParent(id) => write!(f, "dangling-parent:{id}"),
            Self::CycleDetected => write!(f, "cycle-detected"),
            Self::NegativeDuration(id) => write!(f, "negative-duration:{id}"),
            Self::OrphanSubtree(id) => write!(f, "orphan-subtree:{id}"),
        }
    }
}
