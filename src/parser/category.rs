//! Opcode categorization.
//!
//! Maps an opcode mnemonic to the category used for grouping in opcode
//! summaries and flame-graph leaves. Resolution is an exact-match table,
//! then a short ordered list of prefix rules, then `Other`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an EVM opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OpcodeCategory {
    Arithmetic,
    Comparison,
    Bitwise,
    Hash,
    Environment,
    Block,
    Stack,
    Memory,
    Storage,
    TransientStorage,
    Flow,
    Push,
    Dup,
    Swap,
    Log,
    Call,
    Create,
    System,
    Other,
}

impl OpcodeCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Arithmetic => "Arithmetic",
            Self::Comparison => "Comparison",
            Self::Bitwise => "Bitwise",
            Self::Hash => "Hash",
            Self::Environment => "Environment",
            Self::Block => "Block",
            Self::Stack => "Stack",
            Self::Memory => "Memory",
            Self::Storage => "Storage",
            Self::TransientStorage => "TransientStorage",
            Self::Flow => "Flow",
            Self::Push => "Push",
            Self::Dup => "Dup",
            Self::Swap => "Swap",
            Self::Log => "Log",
            Self::Call => "Call",
            Self::Create => "Create",
            Self::System => "System",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for OpcodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const OPCODE_TABLE: &[(&str, OpcodeCategory)] = &[
    ("STOP", OpcodeCategory::Flow),
    ("ADD", OpcodeCategory::Arithmetic),
    ("MUL", OpcodeCategory::Arithmetic),
    ("SUB", OpcodeCategory::Arithmetic),
    ("DIV", OpcodeCategory::Arithmetic),
    ("SDIV", OpcodeCategory::Arithmetic),
    ("MOD", OpcodeCategory::Arithmetic),
    ("SMOD", OpcodeCategory::Arithmetic),
    ("ADDMOD", OpcodeCategory::Arithmetic),
    ("MULMOD", OpcodeCategory::Arithmetic),
    ("EXP", OpcodeCategory::Arithmetic),
    ("SIGNEXTEND", OpcodeCategory::Arithmetic),
    ("LT", OpcodeCategory::Comparison),
    ("GT", OpcodeCategory::Comparison),
    ("SLT", OpcodeCategory::Comparison),
    ("SGT", OpcodeCategory::Comparison),
    ("EQ", OpcodeCategory::Comparison),
    ("ISZERO", OpcodeCategory::Comparison),
    ("AND", OpcodeCategory::Bitwise),
    ("OR", OpcodeCategory::Bitwise),
    ("XOR", OpcodeCategory::Bitwise),
    ("NOT", OpcodeCategory::Bitwise),
    ("BYTE", OpcodeCategory::Bitwise),
    ("SHL", OpcodeCategory::Bitwise),
    ("SHR", OpcodeCategory::Bitwise),
    ("SAR", OpcodeCategory::Bitwise),
    ("KECCAK256", OpcodeCategory::Hash),
    ("SHA3", OpcodeCategory::Hash),
    ("ADDRESS", OpcodeCategory::Environment),
    ("BALANCE", OpcodeCategory::Environment),
    ("ORIGIN", OpcodeCategory::Environment),
    ("CALLER", OpcodeCategory::Environment),
    ("CALLVALUE", OpcodeCategory::Environment),
    ("CALLDATALOAD", OpcodeCategory::Environment),
    ("CALLDATASIZE", OpcodeCategory::Environment),
    ("CALLDATACOPY", OpcodeCategory::Environment),
    ("CODESIZE", OpcodeCategory::Environment),
    ("CODECOPY", OpcodeCategory::Environment),
    ("GASPRICE", OpcodeCategory::Environment),
    ("EXTCODESIZE", OpcodeCategory::Environment),
    ("EXTCODECOPY", OpcodeCategory::Environment),
    ("RETURNDATASIZE", OpcodeCategory::Environment),
    ("RETURNDATACOPY", OpcodeCategory::Environment),
    ("EXTCODEHASH", OpcodeCategory::Environment),
    ("SELFBALANCE", OpcodeCategory::Environment),
    ("GAS", OpcodeCategory::Environment),
    ("BLOCKHASH", OpcodeCategory::Block),
    ("COINBASE", OpcodeCategory::Block),
    ("TIMESTAMP", OpcodeCategory::Block),
    ("NUMBER", OpcodeCategory::Block),
    ("DIFFICULTY", OpcodeCategory::Block),
    ("PREVRANDAO", OpcodeCategory::Block),
    ("GASLIMIT", OpcodeCategory::Block),
    ("CHAINID", OpcodeCategory::Block),
    ("BASEFEE", OpcodeCategory::Block),
    ("BLOBHASH", OpcodeCategory::Block),
    ("BLOBBASEFEE", OpcodeCategory::Block),
    ("POP", OpcodeCategory::Stack),
    ("MLOAD", OpcodeCategory::Memory),
    ("MSTORE", OpcodeCategory::Memory),
    ("MSTORE8", OpcodeCategory::Memory),
    ("MSIZE", OpcodeCategory::Memory),
    ("MCOPY", OpcodeCategory::Memory),
    ("SLOAD", OpcodeCategory::Storage),
    ("SSTORE", OpcodeCategory::Storage),
    ("TLOAD", OpcodeCategory::TransientStorage),
    ("TSTORE", OpcodeCategory::TransientStorage),
    ("JUMP", OpcodeCategory::Flow),
    ("JUMPI", OpcodeCategory::Flow),
    ("PC", OpcodeCategory::Flow),
    ("JUMPDEST", OpcodeCategory::Flow),
    ("CALL", OpcodeCategory::Call),
    ("CALLCODE", OpcodeCategory::Call),
    ("DELEGATECALL", OpcodeCategory::Call),
    ("STATICCALL", OpcodeCategory::Call),
    ("CREATE", OpcodeCategory::Create),
    ("CREATE2", OpcodeCategory::Create),
    ("RETURN", OpcodeCategory::System),
    ("REVERT", OpcodeCategory::System),
    ("INVALID", OpcodeCategory::System),
    ("SELFDESTRUCT", OpcodeCategory::System),
];

// Checked in order, after the exact table
const PREFIX_RULES: &[(&str, OpcodeCategory)] = &[
    ("PUSH", OpcodeCategory::Push),
    ("DUP", OpcodeCategory::Dup),
    ("SWAP", OpcodeCategory::Swap),
    ("LOG", OpcodeCategory::Log),
];

/// Classify an opcode mnemonic. Never fails; unknown mnemonics are `Other`.
pub fn classify(opcode: &str) -> OpcodeCategory {
    let op = opcode.trim().to_ascii_uppercase();

    if let Some((_, category)) = OPCODE_TABLE.iter().find(|(name, _)| *name == op) {
        return *category;
    }

    PREFIX_RULES
        .iter()
        .find(|(prefix, _)| op.starts_with(prefix))
        .map(|(_, category)| *category)
        .unwrap_or(OpcodeCategory::Other)
}
