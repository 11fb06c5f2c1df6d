//! Aggregation of trace data into statistics.
//!
//! This module transforms opcode records and call trees into:
//! - Per-opcode and per-category gas/count summaries
//! - Hot frame analysis (top self-gas consumers)
//! - Gas distribution statistics

pub mod metrics;
pub mod opcodes;

// Re-export main types and functions
pub use metrics::{calculate_gas_distribution, calculate_hot_frames, GasDistribution, HotFrame};
pub use opcodes::{
    aggregate, aggregate_across_scopes, percentage_of, CategoryShare, OpcodeAggregate,
    OpcodeShare, OpcodeStats,
};
