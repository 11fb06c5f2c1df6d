//! EVM Gas Profiler
//!
//! Call-frame gas accounting for indexed EVM transaction traces.
//!
//! Turns the flat call-frame and opcode records of a transaction into a
//! gas-annotated call tree, aggregates opcode statistics by category and
//! computes EIP-3529 refund caps. Everything here works on plain records
//! that were already fetched; there is no network access.
//!
//! ## Getting Started
//!
//! ```ignore
//! use evm_gas_profiler::calltree::build_call_tree;
//!
//! let tree = build_call_tree(&snapshot.frames)?;
//! println!("{} gas", tree.total_gas());
//! ```
//!
//! Or from the command line:
//!
//! ```bash
//! evm-gas-profiler profile --input snapshot.json --opcode-leaves --summary
//! ```

pub mod aggregator;
pub mod calltree;
pub mod commands;
pub mod flamegraph;
pub mod gas;
pub mod output;
pub mod parser;
pub mod utils;
