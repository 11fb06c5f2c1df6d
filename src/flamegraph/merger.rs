//! Decorate a call tree with synthetic opcode leaves for flame graphs.
//!
//! Each frame node gets one leaf per opcode (sorted by gas), capped at the
//! frame's self gas. Whatever part of the node's value neither child frames
//! nor opcode leaves account for goes to an "Uncategorized" leaf, so the
//! children of a decorated frame always sum to its value. That remainder
//! also absorbs gas a root carries beyond its frames (intrinsic cost). The
//! input tree is never modified.

use crate::aggregator::opcodes::aggregate;
use crate::calltree::node::CallTreeNode;
use crate::calltree::warning::TraceWarning;
use crate::parser::schema::OpcodeRecord;
use crate::utils::config::{CODE_DEPOSIT_LABEL, DEFAULT_OPCODE_TOLERANCE, UNCATEGORIZED_LABEL};
use crate::utils::error::TraceError;
use log::{debug, info, warn};
use std::collections::HashMap;

/// Options for opcode leaf synthesis
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Bytecode storage cost charged after constructor return
    pub code_deposit_gas: Option<u64>,

    /// Gas by which a frame's opcode total may exceed its self gas before
    /// merging fails; smaller overshoots are clamped
    pub tolerance: u64,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            code_deposit_gas: None,
            tolerance: DEFAULT_OPCODE_TOLERANCE,
        }
    }
}

impl MergeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code_deposit_gas(mut self, gas: u64) -> Self {
        self.code_deposit_gas = Some(gas);
        self
    }

    pub fn with_tolerance(mut self, tolerance: u64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// Decorated tree plus any clamping that happened
#[derive(Debug, Clone)]
pub struct MergedTree {
    pub root: CallTreeNode,
    pub warnings: Vec<TraceWarning>,
}

/// Return a copy of `tree` with opcode leaves under every frame node
///
/// **Public** - main entry point for flame-graph decoration
///
/// # Errors
/// * `TraceError::InconsistentOpcodeData` - a frame's opcode gas exceeds its
///   self gas by more than `options.tolerance`
pub fn with_opcode_leaves(
    tree: &CallTreeNode,
    opcodes_by_frame: &HashMap<u64, Vec<OpcodeRecord>>,
    options: &MergeOptions,
) -> Result<MergedTree, TraceError> {
    let mut root = tree.clone();
    let mut warnings = Vec::new();
    let mut leaf_count = 0usize;

    let mut stack: Vec<&mut CallTreeNode> = vec![&mut root];
    while let Some(node) = stack.pop() {
        let leaves = opcode_leaves(node, opcodes_by_frame, options.tolerance, &mut warnings)?;
        leaf_count += leaves.len();

        let frame_children = node.children.len();
        node.children.extend(leaves);
        stack.extend(node.children[..frame_children].iter_mut());
    }

    if let Some(gas) = options.code_deposit_gas {
        add_code_deposit(&mut root, gas);
    }

    info!(
        "Added {} opcode leaves ({} clamped frames)",
        leaf_count,
        warnings.len()
    );

    Ok(MergedTree { root, warnings })
}

/// Synthetic leaves for one frame node
///
/// **Private** - frames with neither opcode data nor children get none,
/// since a single full-width leaf adds nothing to the picture
fn opcode_leaves(
    node: &CallTreeNode,
    opcodes_by_frame: &HashMap<u64, Vec<OpcodeRecord>>,
    tolerance: u64,
    warnings: &mut Vec<TraceWarning>,
) -> Result<Vec<CallTreeNode>, TraceError> {
    let (Some(frame_id), Some(self_gas)) = (node.frame_id(), node.self_value) else {
        return Ok(Vec::new());
    };

    let stats = opcodes_by_frame
        .get(&frame_id)
        .map(|records| aggregate(records))
        .unwrap_or_default();

    if stats.is_empty() && node.children.is_empty() {
        return Ok(Vec::new());
    }

    if stats.total_gas > self_gas {
        let excess = stats.total_gas - self_gas;
        if excess > tolerance {
            return Err(TraceError::InconsistentOpcodeData {
                frame_id,
                opcode_gas: stats.total_gas,
                self_gas,
            });
        }
        let warning = TraceWarning::OpcodeGasClamped { frame_id, excess };
        warn!("{}", warning);
        warnings.push(warning);
    }

    // Part of the node's value not covered by child frames
    let gap = node.value.saturating_sub(node.children_value());
    let mut budget = self_gas.min(gap);
    let mut remainder = gap;
    let mut leaves = Vec::new();

    for row in stats.by_gas() {
        let value = row.gas.min(budget);
        if value == 0 {
            continue;
        }
        budget -= value;
        remainder -= value;

        let mut leaf = CallTreeNode::synthetic_leaf(
            &node.id,
            &format!("op-{}", row.opcode),
            row.opcode.clone(),
            value,
            row.category.as_str(),
        );
        leaf.metadata.opcode = Some(row.opcode);
        leaf.metadata.opcode_count = Some(row.count);
        leaves.push(leaf);
    }

    if remainder > 0 {
        debug!(
            "Frame {}: {} of {} gas not covered by child frames or opcode data",
            frame_id, remainder, node.value
        );
        leaves.push(CallTreeNode::synthetic_leaf(
            &node.id,
            "uncategorized",
            UNCATEGORIZED_LABEL,
            remainder,
            UNCATEGORIZED_LABEL,
        ));
    }

    Ok(leaves)
}

/// Add the code-deposit leaf to a contract-creation root
///
/// The deposit is not opcode execution, so it widens the root instead of
/// taking a share of any frame's self gas.
fn add_code_deposit(root: &mut CallTreeNode, gas: u64) {
    let is_creation = root
        .metadata
        .call_type
        .map(|call_type| call_type.is_create())
        .unwrap_or(false);

    if !is_creation {
        debug!("Ignoring code deposit gas for a non-creation transaction");
        return;
    }
    if gas == 0 {
        return;
    }

    let leaf = CallTreeNode::synthetic_leaf(
        &root.id,
        "code-deposit",
        CODE_DEPOSIT_LABEL,
        gas,
        "CodeDeposit",
    );
    root.children.push(leaf);
    root.value = root.value.saturating_add(gas);
}
