//! Gas accounting that sits outside the call tree.

pub mod refund;

pub use refund::{
    apply_refund_cap, effective_refund, london_activation_block, snapshot_refund, RefundSummary,
};
