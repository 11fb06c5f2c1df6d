//! Non-fatal findings reported next to a built or decorated tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A trace anomaly that does not stop tree building
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TraceWarning {
    /// Extra parentless frame; only the lowest id becomes the root
    OrphanRoot { frame_id: u64 },
    /// Frame whose parent chain never reaches the root
    UnreachableFrame { frame_id: u64, parent_frame_id: u64 },
    /// Frame left out because it hangs below an orphan root or unreachable frame
    DetachedFrame { frame_id: u64, subtree_root: u64 },
    DepthMismatch { frame_id: u64, expected: u64, actual: u64 },
    /// `gas_cumulative` disagrees with self gas plus child cumulative gas
    CumulativeMismatch { frame_id: u64, expected: u64, actual: u64 },
    /// Opcode gas exceeded self gas within tolerance and was trimmed
    OpcodeGasClamped { frame_id: u64, excess: u64 },
}

impl fmt::Display for TraceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OrphanRoot { frame_id } => {
                write!(f, "frame {} has no parent but is not the root", frame_id)
            }
            Self::UnreachableFrame {
                frame_id,
                parent_frame_id,
            } => write!(
                f,
                "frame {} references missing parent {}",
                frame_id, parent_frame_id
            ),
            Self::DetachedFrame {
                frame_id,
                subtree_root,
            } => write!(
                f,
                "frame {} is detached from the root below frame {}",
                frame_id, subtree_root
            ),
            Self::DepthMismatch {
                frame_id,
                expected,
                actual,
            } => write!(
                f,
                "frame {} has depth {}, expected {}",
                frame_id, actual, expected
            ),
            Self::CumulativeMismatch {
                frame_id,
                expected,
                actual,
            } => write!(
                f,
                "frame {} reports {} cumulative gas, children imply {}",
                frame_id, actual, expected
            ),
            Self::OpcodeGasClamped { frame_id, excess } => write!(
                f,
                "frame {} opcode gas exceeded self gas by {}, clamped",
                frame_id, excess
            ),
        }
    }
}
