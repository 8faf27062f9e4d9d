//! KPI summary types handed to the report renderer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Signed sum and row count for one group (category or bank)
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupTotal {
    pub sum: Decimal,
    pub count: usize,
}

impl GroupTotal {
    pub fn add(&mut self, amount: Decimal) {
        self.sum += amount;
        self.count += 1;
    }
}

/// Totals for one reporting run.
///
/// `total_income - total_expense == net`, and the `by_category` sums add up
/// to `net`. `total_expense` is a magnitude (non-negative).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KpiSummary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub net: Decimal,
    pub by_category: BTreeMap<String, GroupTotal>,
    pub by_bank: BTreeMap<String, GroupTotal>,
}

impl KpiSummary {
    /// Number of transactions the summary was built from
    pub fn transaction_count(&self) -> usize {
        self.by_bank.values().map(|g| g.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_bank.is_empty()
    }
}
