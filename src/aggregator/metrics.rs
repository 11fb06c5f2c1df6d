//! Calculate hot frames and gas distribution from a call tree.
//!
//! Hot frames are the frames whose own opcodes consume the most gas.
//! These are the primary targets for optimization.

use super::opcodes::percentage_of;
use crate::calltree::builder::CallTree;
use crate::calltree::node::frame_label;
use crate::parser::schema::CallFrame;
use log::debug;
use serde::{Deserialize, Serialize};

/// A frame ranked by self gas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotFrame {
    pub frame_id: u64,
    pub label: String,
    pub depth: u64,
    pub self_gas: u64,
    pub cumulative_gas: u64,
    /// Self gas as a percentage of total gas
    pub percentage: f64,
    pub has_error: bool,
}

/// Calculate hot frames from a call tree
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `tree` - Built call tree
/// * `total_gas` - Total gas used by transaction
/// * `top_n` - Number of top frames to return (e.g., 10)
///
/// # Returns
/// Frames sorted by self gas descending, ties by frame id
pub fn calculate_hot_frames(tree: &CallTree, total_gas: u64, top_n: usize) -> Vec<HotFrame> {
    debug!("Calculating top {} hot frames", top_n);

    let mut frames: Vec<&CallFrame> = tree.frames().collect();
    frames.sort_by(|a, b| {
        b.gas_self
            .cmp(&a.gas_self)
            .then_with(|| a.frame_id.cmp(&b.frame_id))
    });

    frames
        .into_iter()
        .take(top_n)
        .map(|frame| create_hot_frame(frame, total_gas))
        .collect()
}

/// Create a HotFrame from a CallFrame
///
/// **Private** - internal conversion
fn create_hot_frame(frame: &CallFrame, total_gas: u64) -> HotFrame {
    HotFrame {
        frame_id: frame.frame_id,
        label: frame_label(frame),
        depth: frame.depth,
        self_gas: frame.gas_self,
        cumulative_gas: frame.gas_cumulative,
        percentage: percentage_of(frame.gas_self, total_gas),
        has_error: frame.has_error,
    }
}

/// Calculate gas distribution statistics over frame self gas
///
/// **Public** - provides summary statistics
pub fn calculate_gas_distribution(tree: &CallTree) -> GasDistribution {
    let mut weights: Vec<u64> = tree.frames().map(|f| f.gas_self).collect();
    if weights.is_empty() {
        return GasDistribution::default();
    }

    let total: u64 = weights.iter().fold(0u64, |acc, w| acc.saturating_add(*w));
    let count = weights.len();
    let mean = total / count as u64;

    weights.sort_unstable();
    let median = weights[weights.len() / 2];

    // Top 10% of frames by self gas
    let top_10_percent_count = (count as f64 * 0.1).ceil() as usize;
    let top_10_percent_gas: u64 = weights
        .iter()
        .rev()
        .take(top_10_percent_count)
        .fold(0u64, |acc, w| acc.saturating_add(*w));

    GasDistribution {
        total_self_gas: total,
        frame_count: count,
        max_depth: tree.height().saturating_sub(1),
        mean_self_gas: mean,
        median_self_gas: median,
        top_10_percent_gas,
        top_10_percent_percentage: percentage_of(top_10_percent_gas, total),
    }
}

/// Gas distribution statistics
///
/// **Public** - returned from calculate_gas_distribution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasDistribution {
    /// Sum of self gas over all reachable frames
    pub total_self_gas: u64,

    pub frame_count: usize,

    /// Deepest call depth below the root
    pub max_depth: usize,

    pub mean_self_gas: u64,

    pub median_self_gas: u64,

    /// Self gas of the top 10% of frames
    pub top_10_percent_gas: u64,

    /// Percentage of total self gas in the top 10%
    pub top_10_percent_percentage: f64,
}

impl GasDistribution {
    /// Returns true if the top 10% of frames consume more than 80% of gas
    pub fn is_highly_concentrated(&self) -> bool {
        self.top_10_percent_percentage > 80.0
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "Self gas: {} | Frames: {} | Max depth: {} | Mean: {} | Median: {} | Top 10%: {:.1}%",
            self.total_self_gas,
            self.frame_count,
            self.max_depth,
            self.mean_self_gas,
            self.median_self_gas,
            self.top_10_percent_percentage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calltree::build_call_tree;
    use crate::parser::schema::CallType;

    fn tree() -> CallTree {
        let frames = vec![
            CallFrame::new(0, None, 0, CallType::Call, 8000, 10000),
            CallFrame::new(1, Some(0), 1, CallType::Call, 1000, 1000),
            CallFrame::new(2, Some(0), 1, CallType::Call, 500, 1000),
            CallFrame::new(3, Some(2), 2, CallType::StaticCall, 500, 500),
        ];
        build_call_tree(&frames).unwrap()
    }

    #[test]
    fn test_calculate_hot_frames() {
        let hot = calculate_hot_frames(&tree(), 10000, 3);

        assert_eq!(hot.len(), 3);
        assert_eq!(hot[0].frame_id, 0);
        assert_eq!(hot[0].percentage, 80.0);
        assert_eq!(hot[1].frame_id, 1);
        // 500-gas tie resolved by frame id
        assert_eq!(hot[2].frame_id, 2);
    }

    #[test]
    fn test_calculate_gas_distribution() {
        let dist = calculate_gas_distribution(&tree());

        assert_eq!(dist.total_self_gas, 10000);
        assert_eq!(dist.frame_count, 4);
        assert_eq!(dist.max_depth, 2);
        assert_eq!(dist.mean_self_gas, 2500);
        assert_eq!(dist.median_self_gas, 1000);
        assert_eq!(dist.top_10_percent_gas, 8000);
        assert!(!dist.is_highly_concentrated());
    }

    #[test]
    fn test_hot_frames_zero_total() {
        let hot = calculate_hot_frames(&tree(), 0, 1);
        assert_eq!(hot[0].percentage, 0.0);
    }
}
