//! Profile command implementation.
//!
//! The profile command:
//! 1. Reads an indexed trace snapshot
//! 2. Builds the call tree
//! 3. Aggregates opcode statistics
//! 4. Decorates the tree with opcode leaves (if requested)
//! 5. Computes the refund summary
//! 6. Writes output files

use super::models::{ProfileArgs, ProfileOptions};
use crate::aggregator::{aggregate_across_scopes, calculate_gas_distribution, calculate_hot_frames};
use crate::calltree::build_call_tree;
use crate::flamegraph::{stacks_to_string, to_collapsed_stacks, with_opcode_leaves, CollapsedStack};
use crate::gas::snapshot_refund;
use crate::output::{write_profile, write_text, GasProfile};
use crate::parser::{opcodes_by_frame, read_snapshot, TraceSnapshot};
use crate::utils::error::TraceError;
use anyhow::{Context, Result};
use log::{debug, info};
use std::time::Instant;

/// Build the full profile of one transaction in memory
///
/// **Public** - the pure part of the command, usable without any files
///
/// # Errors
/// Any `TraceError` from tree building or opcode merging
pub fn build_profile(
    snapshot: &TraceSnapshot,
    options: &ProfileOptions,
) -> Result<(GasProfile, Vec<CollapsedStack>), TraceError> {
    let tree = build_call_tree(&snapshot.frames)?;
    let mut warnings: Vec<String> = tree.warnings.iter().map(ToString::to_string).collect();

    let by_frame = opcodes_by_frame(&snapshot.opcodes);
    let opcode_stats = aggregate_across_scopes(by_frame.values().map(Vec::as_slice));

    let call_tree = if options.opcode_leaves {
        let merged = with_opcode_leaves(&tree.root, &by_frame, &options.merge)?;
        warnings.extend(merged.warnings.iter().map(ToString::to_string));
        merged.root
    } else {
        tree.root.clone()
    };

    let stacks = to_collapsed_stacks(&call_tree);

    let mut profile = GasProfile::new(
        snapshot.transaction_hash.clone(),
        call_tree,
        snapshot_refund(snapshot),
    );
    profile.opcodes = opcode_stats.by_gas();
    profile.categories = opcode_stats.by_category();
    profile.hot_frames = calculate_hot_frames(&tree, tree.total_gas(), options.top_frames);
    profile.distribution = calculate_gas_distribution(&tree);
    profile.warnings = warnings;

    Ok((profile, stacks))
}

/// Execute the profile command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Snapshot read or parse failures
/// * Trace errors (no root, cycles, inconsistent opcode data)
/// * File write errors
pub fn execute_profile(args: ProfileArgs) -> Result<()> {
    let start_time = Instant::now();

    info!("Profiling snapshot: {}", args.input.display());

    // Step 1: Read snapshot
    info!("Step 1/3: Reading snapshot...");
    let snapshot = read_snapshot(&args.input).context("Failed to read trace snapshot")?;

    debug!(
        "Snapshot for {}: {} frames, {} opcode rows",
        snapshot.transaction_hash,
        snapshot.frames.len(),
        snapshot.opcodes.len()
    );

    // Step 2: Build profile
    info!("Step 2/3: Building call tree and statistics...");
    let (profile, stacks) =
        build_profile(&snapshot, &args.options()).context("Failed to build gas profile")?;

    info!("Gas distribution: {}", profile.distribution.summary());
    for warning in &profile.warnings {
        debug!("  trace warning: {}", warning);
    }

    // Step 3: Write outputs
    info!("Step 3/3: Writing output files...");
    write_profile(&profile, &args.output_json).context("Failed to write profile JSON")?;
    info!("✓ Profile written to: {}", args.output_json.display());

    if let Some(stacks_path) = &args.output_stacks {
        write_text(&stacks_to_string(&stacks), stacks_path)
            .context("Failed to write collapsed stacks")?;
        info!("✓ Collapsed stacks written to: {}", stacks_path.display());
    }

    if args.print_summary {
        println!("\n{}", generate_text_summary(&profile, 10));
    }

    let elapsed = start_time.elapsed();
    info!("Profile completed in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Human-readable summary of a profile
pub fn generate_text_summary(profile: &GasProfile, top_n: usize) -> String {
    let mut out = String::new();
    let rule = "=".repeat(80);

    out.push_str(&format!("{}\nGAS PROFILE SUMMARY\n{}\n", rule, rule));
    out.push_str(&format!("Transaction:  {}\n", profile.transaction_hash));
    out.push_str(&format!("Total Gas:    {}\n", profile.total_gas));
    out.push_str(&format!(
        "Refund:       {} (cap {}{})\n",
        profile.refund.effective,
        profile.refund.cap,
        if profile.refund.is_capped { ", capped" } else { "" }
    ));
    out.push_str(&format!("Warnings:     {}\n", profile.warnings.len()));
    out.push_str(&format!("\n{}\n", profile.distribution.summary()));
    if profile.distribution.is_highly_concentrated() {
        out.push_str("Gas is concentrated in the top 10% of frames\n");
    }

    out.push_str("\nHot frames:\n");
    for (i, frame) in profile.hot_frames.iter().take(top_n).enumerate() {
        out.push_str(&format!(
            "  {:>2}. {:>10} gas ({:>5.1}%)  {}\n",
            i + 1,
            frame.self_gas,
            frame.percentage,
            frame.label
        ));
    }

    out.push_str("\nTop opcodes:\n");
    for (i, op) in profile.opcodes.iter().take(top_n).enumerate() {
        out.push_str(&format!(
            "  {:>2}. {:<14} {:>10} gas ({:>5.1}%)  x{}\n",
            i + 1,
            op.opcode,
            op.gas,
            op.percentage,
            op.count
        ));
    }

    out.push_str(&rule);
    out
}

/// Validate profile arguments
///
/// **Public** - can be called before execute_profile for early validation
pub fn validate_args(args: &ProfileArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input snapshot path cannot be empty");
    }

    if !args.input.exists() {
        anyhow::bail!("Input snapshot not found: {}", args.input.display());
    }

    if args.output_json.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if args.top_frames == 0 {
        anyhow::bail!("top_frames must be greater than 0");
    }

    if args.top_frames > 1000 {
        anyhow::bail!("top_frames is too large (max 1000)");
    }

    if args.code_deposit_gas.is_some() && !args.opcode_leaves {
        anyhow::bail!("--code-deposit-gas requires --opcode-leaves");
    }

    Ok(())
}
