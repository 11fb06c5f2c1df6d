//! Opcode statistics per scope.
//!
//! A scope is a call frame, a block or a time bucket. Aggregation is plain
//! summation keyed by opcode, so merging scopes is commutative and
//! associative and any scope order gives the same totals.

use crate::parser::category::{classify, OpcodeCategory};
use crate::parser::schema::OpcodeRecord;
use log::debug;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Gas and execution count for one opcode (or category)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpcodeStats {
    pub gas: u64,
    pub count: u64,
}

impl OpcodeStats {
    fn add(&mut self, gas: u64, count: u64) {
        self.gas = self.gas.saturating_add(gas);
        self.count = self.count.saturating_add(count);
    }
}

/// Aggregated opcode statistics for one or more scopes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpcodeAggregate {
    pub by_opcode: BTreeMap<String, OpcodeStats>,
    pub total_gas: u64,
    pub total_count: u64,
}

/// One row of a sorted presentation view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpcodeShare {
    pub opcode: String,
    pub category: OpcodeCategory,
    pub gas: u64,
    pub count: u64,
    /// Share of total gas, 0-100
    pub percentage: f64,
}

/// Gas and count for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryShare {
    pub category: OpcodeCategory,
    pub gas: u64,
    pub count: u64,
    pub percentage: f64,
}

/// Aggregate the opcode records of a single scope
///
/// **Public** - main entry point for opcode statistics
pub fn aggregate(records: &[OpcodeRecord]) -> OpcodeAggregate {
    let mut result = OpcodeAggregate::default();
    for record in records {
        result.add(&record.opcode, record.gas, record.count);
    }
    result
}

/// Aggregate several scopes into one summary
pub fn aggregate_across_scopes<'a, I>(scopes: I) -> OpcodeAggregate
where
    I: IntoIterator<Item = &'a [OpcodeRecord]>,
{
    let mut result = OpcodeAggregate::default();
    let mut scope_count = 0usize;

    for records in scopes {
        result.merge(&aggregate(records));
        scope_count += 1;
    }

    debug!(
        "Aggregated {} scopes into {} opcodes ({} gas)",
        scope_count,
        result.by_opcode.len(),
        result.total_gas
    );

    result
}

/// Share of `total` held by `part`, as a percentage; 0 when `total` is 0
pub fn percentage_of(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

impl OpcodeAggregate {
    fn add(&mut self, opcode: &str, gas: u64, count: u64) {
        self.by_opcode.entry(opcode.to_string()).or_default().add(gas, count);
        self.total_gas = self.total_gas.saturating_add(gas);
        self.total_count = self.total_count.saturating_add(count);
    }

    /// Fold another aggregate into this one
    pub fn merge(&mut self, other: &OpcodeAggregate) {
        for (opcode, stats) in &other.by_opcode {
            self.add(opcode, stats.gas, stats.count);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.by_opcode.is_empty()
    }

    pub fn gas_percentage(&self, gas: u64) -> f64 {
        percentage_of(gas, self.total_gas)
    }

    /// Rows sorted by gas descending, ties by opcode name
    pub fn by_gas(&self) -> Vec<OpcodeShare> {
        let mut rows = self.shares();
        rows.sort_by(|a, b| b.gas.cmp(&a.gas).then_with(|| a.opcode.cmp(&b.opcode)));
        rows
    }

    /// Rows sorted by execution count descending, ties by opcode name
    pub fn by_count(&self) -> Vec<OpcodeShare> {
        let mut rows = self.shares();
        rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.opcode.cmp(&b.opcode)));
        rows
    }

    /// Gas and count per category, sorted like `by_gas`
    pub fn by_category(&self) -> Vec<CategoryShare> {
        let mut totals: BTreeMap<OpcodeCategory, OpcodeStats> = BTreeMap::new();
        for (opcode, stats) in &self.by_opcode {
            totals.entry(classify(opcode)).or_default().add(stats.gas, stats.count);
        }

        let mut rows: Vec<CategoryShare> = totals
            .into_iter()
            .map(|(category, stats)| CategoryShare {
                category,
                gas: stats.gas,
                count: stats.count,
                percentage: self.gas_percentage(stats.gas),
            })
            .collect();

        rows.sort_by(|a, b| match b.gas.cmp(&a.gas) {
            Ordering::Equal => a.category.as_str().cmp(b.category.as_str()),
            other => other,
        });
        rows
    }

    fn shares(&self) -> Vec<OpcodeShare> {
        self.by_opcode
            .iter()
            .map(|(opcode, stats)| OpcodeShare {
                opcode: opcode.clone(),
                category: classify(opcode),
                gas: stats.gas,
                count: stats.count,
                percentage: self.gas_percentage(stats.gas),
            })
            .collect()
    }
}
