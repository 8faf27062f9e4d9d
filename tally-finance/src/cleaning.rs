//! Duplicate removal for rows exported twice (overlapping statement ranges,
//! the same transfer seen from both sides of one bank, ...).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::HashSet;

use tally_core::Transaction;

/// Drop later transactions that repeat an earlier one's
/// (date, |amount|, lower-cased trimmed description, bank).
///
/// Returns the kept transactions in order and how many were removed.
pub fn dedupe(txns: &[Transaction]) -> (Vec<Transaction>, usize) {
    let mut seen: HashSet<(NaiveDate, Decimal, String, &str)> = HashSet::new();
    let mut kept = Vec::with_capacity(txns.len());

    for t in txns {
        let key = (
            t.date,
            t.amount.abs().normalize(),
            t.description.trim().to_lowercase(),
            t.bank.as_str(),
        );
        if seen.insert(key) {
            kept.push(t.clone());
        }
    }

    let removed = txns.len() - kept.len();
    (kept, removed)
}
