//! Call tree node types handed to tree-view and flame-graph renderers.

use crate::parser::schema::{CallFrame, CallType};
use crate::utils::config::ADDRESS_TRUNCATE_CHARS;
use serde::{Deserialize, Serialize};

/// One node of the rendered call tree
///
/// Frame nodes carry cumulative gas in `value` and self gas in
/// `self_value`. Synthetic opcode leaves carry their share of the parent's
/// self gas and have no `self_value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTreeNode {
    /// Unique within the tree
    pub id: String,
    pub label: String,
    pub value: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_value: Option<u64>,
    #[serde(default)]
    pub children: Vec<CallTreeNode>,
    /// Call type for frames, opcode category for synthetic leaves
    pub category: String,
    #[serde(default)]
    pub has_error: bool,
    #[serde(default)]
    pub metadata: NodeMetadata,
}

/// Pass-through data for renderers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_type: Option<CallType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opcode_count: Option<u64>,
    /// Opcode mnemonic of a synthetic leaf
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opcode: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

impl CallTreeNode {
    /// Frame node without children
    pub fn from_frame(frame: &CallFrame) -> Self {
        Self {
            id: frame_node_id(frame.frame_id),
            label: frame_label(frame),
            value: frame.gas_cumulative,
            self_value: Some(frame.gas_self),
            children: Vec::new(),
            category: frame.call_type.to_string(),
            has_error: frame.has_error,
            metadata: NodeMetadata {
                frame_id: Some(frame.frame_id),
                call_type: Some(frame.call_type),
                address: frame.target_address.clone(),
                selector: frame.function_selector.clone(),
                depth: Some(frame.depth),
                opcode_count: Some(frame.opcode_count),
                ..NodeMetadata::default()
            },
        }
    }

    /// Synthetic leaf under `parent_id`
    pub fn synthetic_leaf(
        parent_id: &str,
        key: &str,
        label: impl Into<String>,
        value: u64,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: format!("{}/{}", parent_id, key),
            label: label.into(),
            value,
            self_value: None,
            children: Vec::new(),
            category: category.into(),
            has_error: false,
            metadata: NodeMetadata {
                synthetic: true,
                ..NodeMetadata::default()
            },
        }
    }

    pub fn frame_id(&self) -> Option<u64> {
        self.metadata.frame_id
    }

    pub fn is_synthetic(&self) -> bool {
        self.metadata.synthetic
    }

    /// Sum of the direct children's values
    pub fn children_value(&self) -> u64 {
        self.children
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.value))
    }

    /// Depth-first search for the frame node with `frame_id`
    pub fn find_frame(&self, frame_id: u64) -> Option<&CallTreeNode> {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.frame_id() == Some(frame_id) {
                return Some(node);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

pub fn frame_node_id(frame_id: u64) -> String {
    format!("frame-{}", frame_id)
}

/// Call type followed by the target, e.g. `CALL 0x1f98…f984.0xa9059cbb`
pub fn frame_label(frame: &CallFrame) -> String {
    let mut label = frame.call_type.to_string();

    if let Some(address) = frame.target_address.as_deref() {
        label.push(' ');
        label.push_str(&truncate_address(address));
    }
    if let Some(selector) = frame.function_selector.as_deref() {
        label.push('.');
        label.push_str(selector);
    }

    label
}

/// Shorten `0x`-prefixed addresses to their first and last few hex characters
pub fn truncate_address(address: &str) -> String {
    let hex = address.strip_prefix("0x").unwrap_or(address);
    if hex.len() <= ADDRESS_TRUNCATE_CHARS * 2 || !hex.is_ascii() {
        return address.to_string();
    }

    format!(
        "0x{}…{}",
        &hex[..ADDRESS_TRUNCATE_CHARS],
        &hex[hex.len() - ADDRESS_TRUNCATE_CHARS..]
    )
}
