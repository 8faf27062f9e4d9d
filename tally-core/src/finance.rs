//! Canonical transaction record shared by every pipeline stage

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category assigned when a rule set does not name its own default.
pub const UNCATEGORIZED: &str = "uncategorized";

/// A normalized bank-statement transaction.
///
/// Field names and the amount sign are the contract with export and
/// rendering: expenses are negative, income is positive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Booking date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Free-text description, may be empty
    pub description: String,
    /// Positive = income, negative = expense
    pub amount: Decimal,
    /// Short currency code (EUR, USD, ...)
    pub currency: String,
    /// Source tag of the statement this row came from
    pub bank: String,
    /// Set once by the categorizer
    pub category: Option<String>,
}

impl Transaction {
    /// Create an uncategorized transaction
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
        bank: impl Into<String>,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            currency: currency.into(),
            bank: bank.into(),
            category: None,
        }
    }

    /// Return a copy carrying `label` as its category
    pub fn with_category(&self, label: impl Into<String>) -> Self {
        Self {
            category: Some(label.into()),
            ..self.clone()
        }
    }

    /// Category label, falling back to [`UNCATEGORIZED`] before categorization
    pub fn category_label(&self) -> &str {
        self.category.as_deref().unwrap_or(UNCATEGORIZED)
    }

    /// Returns true if this is an expense (negative amount)
    pub fn is_expense(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Returns true if this is income (positive amount)
    pub fn is_income(&self) -> bool {
        self.amount.is_sign_positive() && !self.amount.is_zero()
    }

    /// Get the absolute amount
    pub fn abs_amount(&self) -> Decimal {
        self.amount.abs()
    }
}

/// Semantic fields a raw source column can be resolved to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
    Date,
    Description,
    Amount,
    Debit,
    Credit,
    Currency,
    Indicator,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Description => "description",
            Field::Amount => "amount",
            Field::Debit => "debit",
            Field::Credit => "credit",
            Field::Currency => "currency",
            Field::Indicator => "debit/credit indicator",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nov(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, day).unwrap()
    }

    #[test]
    fn test_transaction_creation() {
        let amount: Decimal = "-15.40".parse().unwrap();
        let t = Transaction::new(nov(5), "LIDL VILNIUS", amount, "EUR", "Swedbank");
        assert!(t.is_expense());
        assert!(!t.is_income());
        assert_eq!(t.abs_amount().to_string(), "15.40");
        assert_eq!(t.category, None);
        assert_eq!(t.category_label(), UNCATEGORIZED);
    }

    #[test]
    fn test_with_category_returns_copy() {
        let t = Transaction::new(
            nov(6),
            "EUKLIDO AKADEMIJA",
            Decimal::new(4000, 2),
            "EUR",
            "Revolut",
        );
        let c = t.with_category("tutoring");
        assert_eq!(c.category.as_deref(), Some("tutoring"));
        assert_eq!(t.category, None);
        assert_eq!(c.amount, t.amount);
    }

    #[test]
    fn test_zero_amount_is_neither() {
        let t = Transaction::new(nov(1), "fee waiver", Decimal::ZERO, "EUR", "Revolut");
        assert!(!t.is_expense());
        assert!(!t.is_income());
    }

    #[test]
    fn test_serialized_field_set() {
        let t = Transaction::new(nov(5), "LIDL", Decimal::new(-1540, 2), "EUR", "Swedbank")
            .with_category("groceries");
        let v = serde_json::to_value(&t).unwrap();
        let keys: Vec<_> = v.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 6);
        assert_eq!(v["date"], "2025-11-05");
        assert_eq!(v["amount"], "-15.40");
        assert_eq!(v["category"], "groceries");
    }
}
