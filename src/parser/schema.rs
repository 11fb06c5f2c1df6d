//! Input record definitions for indexed trace data.
//!
//! These are the plain records handed over by the fetching layer. They are
//! built once per transaction and never mutated by the profiler.

use crate::utils::error::ParseError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Kind of EVM frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CallType {
    Call,
    StaticCall,
    DelegateCall,
    CallCode,
    Create,
    Create2,
}

impl CallType {
    /// True for frames that deploy a contract
    pub fn is_create(self) -> bool {
        matches!(self, Self::Create | Self::Create2)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Call => "CALL",
            Self::StaticCall => "STATICCALL",
            Self::DelegateCall => "DELEGATECALL",
            Self::CallCode => "CALLCODE",
            Self::Create => "CREATE",
            Self::Create2 => "CREATE2",
        }
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One call/create frame within a transaction trace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    /// Unique within the transaction
    #[serde(deserialize_with = "de_gas")]
    pub frame_id: u64,

    /// `None` only for the depth-0 root
    #[serde(default, deserialize_with = "de_opt_gas")]
    pub parent_frame_id: Option<u64>,

    #[serde(default, deserialize_with = "de_gas")]
    pub depth: u64,

    pub call_type: CallType,

    #[serde(default)]
    pub target_address: Option<String>,

    #[serde(default)]
    pub function_selector: Option<String>,

    /// Gas consumed by this frame's own opcodes
    #[serde(default, deserialize_with = "de_gas")]
    pub gas_self: u64,

    /// Gas consumed by this frame and all descendants
    #[serde(default, deserialize_with = "de_gas")]
    pub gas_cumulative: u64,

    #[serde(default, deserialize_with = "de_gas")]
    pub opcode_count: u64,

    /// Raw (uncapped) refund counter contributed at this scope
    #[serde(default, deserialize_with = "de_gas")]
    pub gas_refund: u64,

    #[serde(default)]
    pub has_error: bool,
}

impl CallFrame {
    /// Create a frame with the gas figures that matter for tree building
    ///
    /// Optional fields start empty; set them directly on the returned value.
    pub fn new(
        frame_id: u64,
        parent_frame_id: Option<u64>,
        depth: u64,
        call_type: CallType,
        gas_self: u64,
        gas_cumulative: u64,
    ) -> Self {
        Self {
            frame_id,
            parent_frame_id,
            depth,
            call_type,
            target_address: None,
            function_selector: None,
            gas_self,
            gas_cumulative,
            opcode_count: 0,
            gas_refund: 0,
            has_error: false,
        }
    }
}

/// One aggregated row of opcode execution within a scope
///
/// A scope is a call frame, a block, or a time bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpcodeRecord {
    #[serde(deserialize_with = "de_scope_key")]
    pub scope_key: String,

    pub opcode: String,

    #[serde(default, deserialize_with = "de_gas")]
    pub gas: u64,

    #[serde(default, deserialize_with = "de_gas")]
    pub count: u64,
}

impl OpcodeRecord {
    pub fn new(
        scope_key: impl Into<String>,
        opcode: impl Into<String>,
        gas: u64,
        count: u64,
    ) -> Self {
        Self {
            scope_key: scope_key.into(),
            opcode: opcode.into(),
            gas,
            count,
        }
    }
}

/// Parse a gas value from hex or decimal string
pub fn parse_gas_value(value: &str) -> Result<u64, ParseError> {
    let value = value.trim();
    if let Some(hex_str) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        u64::from_str_radix(hex_str, 16)
            .map_err(|e| ParseError::InvalidFormat(format!("Invalid hex gas value: {}", e)))
    } else {
        value
            .parse::<u64>()
            .map_err(|e| ParseError::InvalidFormat(format!("Invalid decimal gas value: {}", e)))
    }
}

/// Number, decimal string or hex string
#[derive(Deserialize)]
#[serde(untagged)]
enum GasRepr {
    Number(u64),
    Text(String),
}

impl GasRepr {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            GasRepr::Number(n) => Ok(n),
            GasRepr::Text(s) => parse_gas_value(&s).map_err(E::custom),
        }
    }
}

fn de_gas<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    GasRepr::deserialize(deserializer)?.into_u64()
}

fn de_opt_gas<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Option::<GasRepr>::deserialize(deserializer)?
        .map(GasRepr::into_u64)
        .transpose()
}

fn de_scope_key<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match GasRepr::deserialize(deserializer)? {
        GasRepr::Number(n) => n.to_string(),
        GasRepr::Text(s) => s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_gas_value_hex_and_decimal() {
        assert_eq!(parse_gas_value("0x1a").unwrap(), 26);
        assert_eq!(parse_gas_value("21000").unwrap(), 21000);
        assert!(parse_gas_value("0xzz").is_err());
        assert!(parse_gas_value("abc").is_err());
    }

    #[test]
    fn test_call_frame_accepts_mixed_numeric_encodings() {
        let frame: CallFrame = serde_json::from_value(json!({
            "frameId": 1,
            "parentFrameId": "0",
            "depth": 1,
            "callType": "DELEGATECALL",
            "gasSelf": "0x64",
            "gasCumulative": 300,
            "hasError": true
        }))
        .unwrap();

        assert_eq!(frame.parent_frame_id, Some(0));
        assert_eq!(frame.call_type, CallType::DelegateCall);
        assert_eq!(frame.gas_self, 100);
        assert_eq!(frame.gas_cumulative, 300);
        assert_eq!(frame.opcode_count, 0);
        assert!(frame.has_error);
    }

    #[test]
    fn test_root_frame_has_null_parent() {
        let frame: CallFrame = serde_json::from_value(json!({
            "frameId": 0,
            "parentFrameId": null,
            "depth": 0,
            "callType": "CREATE2"
        }))
        .unwrap();

        assert_eq!(frame.parent_frame_id, None);
        assert!(frame.call_type.is_create());
    }

    #[test]
    fn test_opcode_record_numeric_scope_key() {
        let record: OpcodeRecord = serde_json::from_value(json!({
            "scopeKey": 4,
            "opcode": "SLOAD",
            "gas": 2100,
            "count": 1
        }))
        .unwrap();

        assert_eq!(record.scope_key, "4");
        assert_eq!(record.gas, 2100);
    }
}
