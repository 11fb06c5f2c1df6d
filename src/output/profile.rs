//! Output JSON schema for a profiled transaction.
//!
//! Schema is versioned to allow future evolution.

use crate::aggregator::{CategoryShare, GasDistribution, HotFrame, OpcodeShare};
use crate::calltree::node::CallTreeNode;
use crate::gas::refund::RefundSummary;
use crate::utils::config::SCHEMA_VERSION;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Top-level profile structure written to JSON
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GasProfile {
    /// Schema version for compatibility checking
    pub version: String,

    pub transaction_hash: String,

    /// Total gas as seen by the root frame
    pub total_gas: u64,

    pub call_tree: CallTreeNode,

    /// Opcodes over all frames, by gas
    pub opcodes: Vec<OpcodeShare>,

    pub categories: Vec<CategoryShare>,

    pub hot_frames: Vec<HotFrame>,

    pub distribution: GasDistribution,

    pub refund: RefundSummary,

    /// Rendered trace warnings
    #[serde(default)]
    pub warnings: Vec<String>,

    /// Timestamp when profile was generated
    pub generated_at: String,
}

impl GasProfile {
    /// Start a profile stamped with the current schema version and time
    pub fn new(
        transaction_hash: impl Into<String>,
        call_tree: CallTreeNode,
        refund: RefundSummary,
    ) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            transaction_hash: transaction_hash.into(),
            total_gas: call_tree.value,
            call_tree,
            opcodes: Vec::new(),
            categories: Vec::new(),
            hot_frames: Vec::new(),
            distribution: GasDistribution::default(),
            refund,
            warnings: Vec::new(),
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}
