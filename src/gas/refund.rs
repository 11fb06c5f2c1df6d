//! Fork-aware gas refund caps.
//!
//! EIP-3529 (London) lowered the share of gas a refund may recover. The cap
//! here is applied to *receipt* gas, i.e. gas after the refund was already
//! deducted: with `gasUsed = receipt + refund`, a post-London cap of
//! `gasUsed / 5` is `receipt / 4`.

use crate::parser::TraceSnapshot;
use crate::utils::config::{ASSUME_POST_LONDON_WHEN_UNKNOWN, LONDON_ACTIVATION_BLOCKS};
use log::debug;
use serde::{Deserialize, Serialize};

/// Refund figures shown next to the call tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundSummary {
    /// Refund actually credited
    pub effective: u64,
    /// Maximum refund allowed for this transaction
    pub cap: u64,
    /// True when the raw counter exceeded the cap
    pub is_capped: bool,
    pub is_post_london: bool,
}

/// Whether `block_number` falls after the London activation block
///
/// Missing fork configuration resolves to `ASSUME_POST_LONDON_WHEN_UNKNOWN`.
pub fn is_post_london(block_number: u64, london_activation_block: Option<u64>) -> bool {
    match london_activation_block {
        Some(activation) => block_number >= activation,
        None => {
            debug!(
                "No London activation block configured, assuming post_london={}",
                ASSUME_POST_LONDON_WHEN_UNKNOWN
            );
            ASSUME_POST_LONDON_WHEN_UNKNOWN
        }
    }
}

/// Maximum refund for a transaction with the given receipt gas
pub fn refund_cap(receipt_gas: u64, is_post_london: bool) -> u64 {
    if is_post_london {
        receipt_gas / 4
    } else {
        receipt_gas
    }
}

/// Apply the cap once the fork is already known
pub fn apply_refund_cap(raw_refund: u64, receipt_gas: u64, is_post_london: bool) -> RefundSummary {
    if raw_refund == 0 {
        return RefundSummary {
            effective: 0,
            cap: 0,
            is_capped: false,
            is_post_london: true,
        };
    }

    let cap = refund_cap(receipt_gas, is_post_london);

    RefundSummary {
        effective: raw_refund.min(cap),
        cap,
        is_capped: raw_refund > cap,
        is_post_london,
    }
}

/// Compute the refund actually credited for a transaction
///
/// **Public** - main entry point for refund figures
///
/// # Arguments
/// * `raw_refund` - Uncapped EVM refund counter
/// * `receipt_gas` - Gas used as reported by the receipt
/// * `block_number` - Block the transaction was included in
/// * `london_activation_block` - London fork block, if known
pub fn effective_refund(
    raw_refund: u64,
    receipt_gas: u64,
    block_number: u64,
    london_activation_block: Option<u64>,
) -> RefundSummary {
    if raw_refund == 0 {
        return apply_refund_cap(0, receipt_gas, true);
    }

    let post_london = is_post_london(block_number, london_activation_block);
    apply_refund_cap(raw_refund, receipt_gas, post_london)
}

/// Known London activation block for a chain
pub fn london_activation_block(chain_id: u64) -> Option<u64> {
    LONDON_ACTIVATION_BLOCKS
        .iter()
        .find(|(id, _)| *id == chain_id)
        .map(|(_, block)| *block)
}

/// Refund summary for a snapshot
///
/// An explicit activation block in the snapshot wins over the chain lookup.
pub fn snapshot_refund(snapshot: &TraceSnapshot) -> RefundSummary {
    let activation = snapshot
        .london_activation_block
        .or_else(|| snapshot.chain_id.and_then(london_activation_block));

    effective_refund(
        snapshot.raw_refund(),
        snapshot.receipt_gas_used,
        snapshot.block_number,
        activation,
    )
}
