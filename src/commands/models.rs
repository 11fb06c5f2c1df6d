use crate::flamegraph::MergeOptions;
use crate::utils::config::{DEFAULT_OPCODE_TOLERANCE, DEFAULT_TOP_FRAMES};
use std::path::PathBuf;

/// Arguments for the profile command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct ProfileArgs {
    /// Snapshot JSON exported by the indexer
    pub input: PathBuf,

    /// Output path for JSON profile
    pub output_json: PathBuf,

    /// Output path for collapsed stacks (optional)
    pub output_stacks: Option<PathBuf>,

    /// Number of hot frames to include in profile
    pub top_frames: usize,

    /// Decorate the call tree with opcode leaves
    pub opcode_leaves: bool,

    /// Code deposit gas for contract-creation transactions
    pub code_deposit_gas: Option<u64>,

    /// Allowed opcode gas overshoot per frame
    pub opcode_tolerance: u64,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for ProfileArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("snapshot.json"),
            output_json: PathBuf::from("profile.json"),
            output_stacks: None,
            top_frames: DEFAULT_TOP_FRAMES,
            opcode_leaves: false,
            code_deposit_gas: None,
            opcode_tolerance: DEFAULT_OPCODE_TOLERANCE,
            print_summary: false,
        }
    }
}

impl ProfileArgs {
    /// Options for building the profile itself, without any file paths
    pub fn options(&self) -> ProfileOptions {
        let mut merge = MergeOptions::new().with_tolerance(self.opcode_tolerance);
        if let Some(gas) = self.code_deposit_gas {
            merge = merge.with_code_deposit_gas(gas);
        }

        ProfileOptions {
            top_frames: self.top_frames,
            opcode_leaves: self.opcode_leaves,
            merge,
        }
    }
}

/// In-memory profile options
#[derive(Debug, Clone)]
pub struct ProfileOptions {
    pub top_frames: usize,
    pub opcode_leaves: bool,
    pub merge: MergeOptions,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        ProfileArgs::default().options()
    }
}
