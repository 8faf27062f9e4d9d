//! Restrict a transaction sequence to one reporting month.

use tally_core::{Transaction, YearMonth};

/// Keep transactions dated within `month` (first and last day inclusive),
/// preserving order. An empty result is not an error here; the pipeline
/// reports it.
pub fn filter_month(txns: &[Transaction], month: YearMonth) -> Vec<Transaction> {
    txns.iter()
        .filter(|t| month.contains(t.date))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn on(y: i32, m: u32, d: u32, desc: &str) -> Transaction {
        Transaction::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            desc,
            Decimal::ONE,
            "EUR",
            "bank",
        )
    }

    #[test]
    fn test_month_boundaries() {
        let nov = YearMonth::new(2025, 11).unwrap();
        let txns = vec![
            on(2025, 10, 31, "before"),
            on(2025, 11, 1, "first"),
            on(2025, 11, 30, "last"),
            on(2025, 12, 1, "after"),
        ];
        let kept: Vec<_> = filter_month(&txns, nov).into_iter().map(|t| t.description).collect();
        assert_eq!(kept, vec!["first", "last"]);
    }

    #[test]
    fn test_preserves_relative_order() {
        let feb = YearMonth::new(2024, 2).unwrap();
        let txns = vec![on(2024, 2, 29, "a"), on(2024, 2, 1, "b"), on(2024, 2, 15, "c")];
        let kept: Vec<_> = filter_month(&txns, feb).into_iter().map(|t| t.description).collect();
        assert_eq!(kept, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let jan = YearMonth::new(2026, 1).unwrap();
        assert!(filter_month(&[on(2025, 11, 5, "x")], jan).is_empty());
        assert!(filter_month(&[], jan).is_empty());
    }
}
