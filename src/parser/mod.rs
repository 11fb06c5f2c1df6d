//! Trace input parsing and schema definitions.
//!
//! This module handles:
//! - Defining the call frame and opcode record types
//! - Parsing already-fetched snapshot JSON
//! - Classifying opcodes into categories

pub mod category;
pub mod schema;
pub mod snapshot;

// Re-export main types
pub use category::{classify, OpcodeCategory};
pub use schema::{parse_gas_value, CallFrame, CallType, OpcodeRecord};
pub use snapshot::{opcodes_by_frame, parse_snapshot, read_snapshot, TraceSnapshot};
