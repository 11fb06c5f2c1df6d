//! JSON profile output writer.
//!
//! Writes GasProfile structs to JSON files with proper formatting.

use super::profile::GasProfile;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write a profile to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_profile(
    profile: &GasProfile,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing profile to: {}", output_path.display());

    let mut writer = create_writer(output_path)?;
    write_nested(profile, &mut writer)?;
    writer.flush()?;

    info!(
        "Profile written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Write text content (collapsed stacks, summaries) to a file
pub fn write_text(content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    debug!("Writing text output to: {}", output_path.display());

    let mut writer = create_writer(output_path)?;
    writer.write_all(content.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    Ok(())
}

/// Pretty-print a profile without bounding call tree depth
///
/// **Private** - the stack grows on demand for deep call trees
fn write_nested<W: Write>(profile: &GasProfile, writer: W) -> Result<(), OutputError> {
    let mut json = serde_json::Serializer::pretty(writer);
    profile
        .serialize(serde_stacker::Serializer::new(&mut json))
        .map_err(OutputError::SerializationFailed)
}

/// Validate the path, create parent directories and open the file
///
/// **Private** - shared by the writers
fn create_writer(output_path: &Path) -> Result<BufWriter<File>, OutputError> {
    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    Ok(BufWriter::new(file))
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Calculate file size in bytes
///
/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read a profile from a JSON file
///
/// **Public** - useful for validation and testing
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error
pub fn read_profile(input_path: impl AsRef<Path>) -> Result<GasProfile, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading profile from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;

    // Call trees may nest past serde_json's default limit of 128
    let mut json = serde_json::Deserializer::from_reader(BufReader::new(file));
    json.disable_recursion_limit();
    let profile = GasProfile::deserialize(serde_stacker::Deserializer::new(&mut json))
        .map_err(OutputError::SerializationFailed)?;
    json.end().map_err(OutputError::SerializationFailed)?;

    debug!(
        "Profile loaded: version {}, tx {}",
        profile.version, profile.transaction_hash
    );

    Ok(profile)
}
