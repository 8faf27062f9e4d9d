//! Deterministic categorization: the first configured rule whose terms occur
//! in a transaction's description names its category.

use tally_core::{RuleSet, Transaction};
use tracing::info;

/// Categorize every transaction against `rules`.
///
/// Returns a new sequence in the same order; inputs are left untouched. Rules
/// are evaluated strictly in configuration order and the first match wins;
/// unmatched transactions get the rule set's default category.
pub fn categorize(txns: &[Transaction], rules: &RuleSet) -> Vec<Transaction> {
    let out: Vec<Transaction> = txns
        .iter()
        .map(|t| t.with_category(rules.label_for(&t.description)))
        .collect();

    let defaulted = out
        .iter()
        .filter(|t| t.category_label() == rules.default_category())
        .count();
    info!(
        total = out.len(),
        defaulted,
        rules = rules.rules().len(),
        "categorized transactions"
    );
    out
}
