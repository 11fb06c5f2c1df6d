//! Configuration and constants for the profiler.

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Label of the synthetic leaf that absorbs self gas not covered by opcode data
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// Label of the synthetic root leaf for bytecode storage cost after constructor return
pub const CODE_DEPOSIT_LABEL: &str = "Code Deposit";

/// Hex characters kept on each side of a truncated address label
pub const ADDRESS_TRUNCATE_CHARS: usize = 4;

/// Default number of frames reported as hot frames
pub const DEFAULT_TOP_FRAMES: usize = 10;

/// Gas by which opcode totals may exceed frame self gas before it is an error
pub const DEFAULT_OPCODE_TOLERANCE: u64 = 0;

/// Fork classification used when no London activation block is known.
///
/// Pre-London blocks are misclassified when configuration is missing.
pub const ASSUME_POST_LONDON_WHEN_UNKNOWN: bool = true;

// London (EIP-3529) activation blocks by chain id
pub const LONDON_ACTIVATION_BLOCKS: &[(u64, u64)] = &[
    (1, 12_965_000), // mainnet
    (5, 5_062_605), // goerli
    (11_155_111, 0), // sepolia
    (17_000, 0), // holesky
    (560_048, 0), // hoodi
];

// Field names for the frame list and opcode list in snapshots
// (different indexer exports use different names)
pub const FRAME_FIELD_NAMES: &[&str] = &["frames", "callFrames", "call_frames"];
pub const OPCODE_FIELD_NAMES: &[&str] = &["opcodes", "opcodeRecords", "opcode_records"];
