//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors raised while turning call frames into a call tree
///
/// All of these are recoverable by the caller: the presentation layer decides
/// whether to show partial data or a warning banner.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    #[error("Malformed trace: {0}")]
    MalformedTrace(String),

    #[error("Cyclic trace: frame {frame_id} is reachable from itself through parent links")]
    CyclicTrace { frame_id: u64 },

    #[error(
        "Inconsistent opcode data for frame {frame_id}: opcodes account for {opcode_gas} gas \
         but the frame only consumed {self_gas}"
    )]
    InconsistentOpcodeData {
        frame_id: u64,
        opcode_gas: u64,
        self_gas: u64,
    },
}

/// Errors that can occur during snapshot parsing
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid snapshot format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
