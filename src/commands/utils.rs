use crate::output::read_profile;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a profile JSON file
pub fn validate_profile_file(file_path: PathBuf) -> Result<()> {
    println!("Validating profile: {}", file_path.display());

    let profile = read_profile(&file_path)?;

    println!("✓ Valid profile JSON");
    println!("  Version: {}", profile.version);
    println!("  Transaction: {}", profile.transaction_hash);
    println!("  Total Gas: {}", profile.total_gas);
    println!("  Tree Nodes: {}", profile.call_tree.node_count());
    println!("  Opcodes: {}", profile.opcodes.len());
    println!("  Hot Frames: {}", profile.hot_frames.len());
    println!("  Warnings: {}", profile.warnings.len());

    if profile.version != SCHEMA_VERSION {
        println!(
            "  ! Schema version differs from this build ({})",
            SCHEMA_VERSION
        );
    }

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("EVM Gas Profiler Profile Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string           - Schema version (e.g., '1.0.0')");
        println!("  transactionHash: string   - Transaction hash");
        println!("  totalGas: number          - Gas of the root frame");
        println!("  callTree: object          - Call tree node");
        println!("    id, label: string       - Node identity and display text");
        println!("    value: number           - Cumulative gas (frame) or gas share (leaf)");
        println!("    selfValue: number?      - Frame self gas");
        println!("    category: string        - Call type or opcode category");
        println!("    hasError: boolean       - Frame reverted");
        println!("    children: array         - Child nodes, ascending by frame id");
        println!("  opcodes: array            - Opcode gas/count, by gas");
        println!("  categories: array         - Category gas/count, by gas");
        println!("  hotFrames: array          - Frames ranked by self gas");
        println!("  distribution: object      - Self gas distribution statistics");
        println!("  refund: object            - effective, cap, isCapped, isPostLondon");
        println!("  warnings: array           - Trace anomalies");
        println!("  generatedAt: string       - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("EVM Gas Profiler v{}", env!("CARGO_PKG_VERSION"));
    println!("Profile Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Call-frame gas accounting for indexed EVM transaction traces.");
}
