//! EVM Gas Profiler CLI
//!
//! Builds gas-annotated call trees, opcode statistics and refund summaries
//! from indexed transaction trace snapshots.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use evm_gas_profiler::commands::{
    display_schema, display_version, execute_profile, validate_args, validate_profile_file,
    ProfileArgs,
};
use evm_gas_profiler::utils::config::{DEFAULT_OPCODE_TOLERANCE, DEFAULT_TOP_FRAMES};

/// EVM Gas Profiler - call-frame gas accounting for EVM transactions
#[derive(Parser, Debug)]
#[command(name = "evm-gas-profiler")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Profile a transaction from an indexed trace snapshot
    Profile {
        /// Snapshot JSON (frames, opcodes and receipt metadata)
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for JSON profile
        #[arg(short, long, default_value = "profile.json")]
        output: PathBuf,

        /// Output path for collapsed stacks (optional)
        #[arg(long)]
        stacks: Option<PathBuf>,

        /// Number of hot frames to include
        #[arg(long, default_value_t = DEFAULT_TOP_FRAMES)]
        top_frames: usize,

        /// Add per-opcode leaves under every frame
        #[arg(long)]
        opcode_leaves: bool,

        /// Code deposit gas to show under a contract-creation root
        #[arg(long)]
        code_deposit_gas: Option<u64>,

        /// Gas by which opcode totals may exceed frame self gas
        #[arg(long, default_value_t = DEFAULT_OPCODE_TOLERANCE)]
        opcode_tolerance: u64,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a profile JSON file
    Validate {
        /// Path to profile JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Profile {
            input,
            output,
            stacks,
            top_frames,
            opcode_leaves,
            code_deposit_gas,
            opcode_tolerance,
            summary,
        } => {
            let args = ProfileArgs {
                input,
                output_json: output,
                output_stacks: stacks,
                top_frames,
                opcode_leaves,
                code_deposit_gas,
                opcode_tolerance,
                print_summary: summary,
            };

            validate_args(&args)?;
            execute_profile(args)?;
        }

        Commands::Validate { file } => {
            validate_profile_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
