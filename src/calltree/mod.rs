//! Hierarchical call trees with gas metrics.
//!
//! This module turns the flat frame list of a transaction into:
//! - A rooted tree of `CallTreeNode` for tree views and flame graphs
//! - An index for breadcrumb (`path_to`) and subtree (`descendants_of`) queries
//! - Warnings for anomalies that do not prevent building

pub mod builder;
pub mod node;
pub mod warning;

// Re-export main types and functions
pub use builder::{build_call_tree, CallTree};
pub use node::{CallTreeNode, NodeMetadata};
pub use warning::TraceWarning;
