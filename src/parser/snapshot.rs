//! Trace snapshot parser.
//!
//! Decodes the already-fetched JSON export of one transaction (frames,
//! opcode rows and receipt metadata) into plain records.

use super::schema::{parse_gas_value, CallFrame, OpcodeRecord};
use crate::utils::config::{FRAME_FIELD_NAMES, OPCODE_FIELD_NAMES};
use crate::utils::error::ParseError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Indexed trace data for a single transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSnapshot {
    pub transaction_hash: String,
    pub block_number: u64,
    pub chain_id: Option<u64>,
    /// Gas used as reported by the receipt
    pub receipt_gas_used: u64,
    /// Transaction-level raw refund counter, when the indexer exports it
    pub gas_refund: Option<u64>,
    pub london_activation_block: Option<u64>,
    pub frames: Vec<CallFrame>,
    pub opcodes: Vec<OpcodeRecord>,
}

impl TraceSnapshot {
    /// Raw refund: the exported transaction counter, or the sum over frames
    pub fn raw_refund(&self) -> u64 {
        self.gas_refund.unwrap_or_else(|| {
            self.frames
                .iter()
                .fold(0u64, |acc, f| acc.saturating_add(f.gas_refund))
        })
    }
}

/// Parse a snapshot from raw JSON
///
/// **Public** - main entry point for parsing
///
/// # Errors
/// * `ParseError::InvalidFormat` - not an object, missing frames, bad numbers
/// * `ParseError::JsonError` - a frame does not match the frame schema
pub fn parse_snapshot(raw: &serde_json::Value) -> Result<TraceSnapshot, ParseError> {
    let obj = raw.as_object().ok_or_else(|| {
        ParseError::InvalidFormat("Snapshot must be a JSON object".to_string())
    })?;

    let transaction_hash = obj
        .get("transactionHash")
        .or_else(|| obj.get("transaction_hash"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    debug!("Parsing snapshot for transaction: {}", transaction_hash);

    let frames_value = FRAME_FIELD_NAMES
        .iter()
        .find_map(|field| obj.get(*field).and_then(|v| v.as_array()))
        .ok_or_else(|| ParseError::InvalidFormat("Snapshot has no frame list".to_string()))?;

    // A broken frame would corrupt the tree, so frames are strict
    let frames = frames_value
        .iter()
        .map(|v| serde_json::from_value::<CallFrame>(v.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    let opcodes = OPCODE_FIELD_NAMES
        .iter()
        .find_map(|field| obj.get(*field).and_then(|v| v.as_array()))
        .map(|rows| parse_opcode_rows(rows))
        .unwrap_or_default();

    let receipt_gas_used = optional_u64(obj, &["receiptGasUsed", "gasUsed", "receipt_gas_used"])?
        .unwrap_or(0);

    let snapshot = TraceSnapshot {
        transaction_hash,
        block_number: optional_u64(obj, &["blockNumber", "block_number"])?.unwrap_or(0),
        chain_id: optional_u64(obj, &["chainId", "chain_id"])?,
        receipt_gas_used,
        gas_refund: optional_u64(obj, &["gasRefund", "gas_refund"])?,
        london_activation_block: optional_u64(
            obj,
            &["londonActivationBlock", "london_activation_block"],
        )?,
        frames,
        opcodes,
    };

    debug!(
        "Parsed {} frames and {} opcode rows",
        snapshot.frames.len(),
        snapshot.opcodes.len()
    );

    Ok(snapshot)
}

/// Read and parse a snapshot file
pub fn read_snapshot(path: impl AsRef<Path>) -> Result<TraceSnapshot, ParseError> {
    let path = path.as_ref();
    debug!("Reading snapshot from: {}", path.display());

    let file = File::open(path)?;
    let raw: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;
    parse_snapshot(&raw)
}

/// Group opcode records by owning frame id
///
/// Records whose scope key is not a frame id (block or bucket scopes) are skipped.
pub fn opcodes_by_frame(records: &[OpcodeRecord]) -> HashMap<u64, Vec<OpcodeRecord>> {
    let mut grouped: HashMap<u64, Vec<OpcodeRecord>> = HashMap::new();

    for record in records {
        match record.scope_key.parse::<u64>() {
            Ok(frame_id) => grouped.entry(frame_id).or_default().push(record.clone()),
            Err(_) => debug!("Skipping non-frame scope '{}'", record.scope_key),
        }
    }

    grouped
}

/// Parse opcode rows, skipping malformed ones
///
/// **Private** - opcode data may be partial, so a bad row is not fatal
fn parse_opcode_rows(rows: &[serde_json::Value]) -> Vec<OpcodeRecord> {
    let mut records = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        match serde_json::from_value::<OpcodeRecord>(row.clone()) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Failed to parse opcode row {}: {}", index, e),
        }
    }

    records
}

/// Look up the first present field among `names` as a u64
fn optional_u64(
    obj: &serde_json::Map<String, serde_json::Value>,
    names: &[&str],
) -> Result<Option<u64>, ParseError> {
    let Some(val) = names.iter().find_map(|n| obj.get(*n)).filter(|v| !v.is_null()) else {
        return Ok(None);
    };

    if let Some(n) = val.as_u64() {
        Ok(Some(n))
    } else if let Some(s) = val.as_str() {
        parse_gas_value(s).map(Some)
    } else {
        Err(ParseError::InvalidFormat(format!(
            "Expected number or string, found {}",
            val
        )))
    }
}
