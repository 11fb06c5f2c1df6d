//! Flame-graph preparation of call trees.
//!
//! This module decorates call trees with opcode leaves so that every
//! node's children subdivide its width exactly, and exports trees as
//! collapsed stacks for external flamegraph tooling.

pub mod merger;
pub mod stacks;

// Re-export main types
pub use merger::{with_opcode_leaves, MergeOptions, MergedTree};
pub use stacks::{stacks_to_string, to_collapsed_stacks, CollapsedStack};
