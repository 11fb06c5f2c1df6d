//! Collapsed stack export of a call tree.
//!
//! Collapsed stacks are the input format of common flamegraph tools.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "CALL 0x1f98…f984;STATICCALL 0xa0b8…eb48;SLOAD 2100"
//! The weight of a line is the gas its last node spent outside its children.

use crate::calltree::node::CallTreeNode;
use log::debug;
use serde::{Deserialize, Serialize};

/// A single collapsed stack entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Gas not attributed to any child of the last node
    pub weight: u64,
}

impl CollapsedStack {
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Render as one `stack weight` line
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from a (possibly decorated) call tree
///
/// Zero-weight stacks are omitted. Result is sorted by weight descending,
/// then by stack text.
pub fn to_collapsed_stacks(root: &CallTreeNode) -> Vec<CollapsedStack> {
    let mut stacks = Vec::new();
    let mut pending: Vec<(&CallTreeNode, String)> = vec![(root, frame_segment(root))];

    while let Some((node, path)) = pending.pop() {
        let weight = node.value.saturating_sub(node.children_value());
        if weight > 0 {
            stacks.push(CollapsedStack::new(path.clone(), weight));
        }

        for child in &node.children {
            pending.push((child, format!("{};{}", path, frame_segment(child))));
        }
    }

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));
    debug!("Built {} collapsed stacks", stacks.len());

    stacks
}

/// Join stacks into the text format, one per line
pub fn stacks_to_string(stacks: &[CollapsedStack]) -> String {
    stacks
        .iter()
        .map(CollapsedStack::to_line)
        .collect::<Vec<_>>()
        .join("\n")
}

// A ';' inside a label would split the frame in two
fn frame_segment(node: &CallTreeNode) -> String {
    node.label.replace(';', ",")
}
