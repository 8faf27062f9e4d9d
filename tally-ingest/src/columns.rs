//! Column resolution: map a source's header names onto semantic fields.
//!
//! Every field has an ordered alias list; matching is case-insensitive on
//! trimmed names and the first alias present in the source wins.

use tally_core::{Error, Field, Result};

/// Ordered alias list per semantic field (lowercase).
pub const ALIASES: &[(Field, &[&str])] = &[
    (
        Field::Date,
        &[
            "date",
            "completed date",
            "started date",
            "transaction date",
            "booking date",
            "trans date",
            "posted date",
            "post date",
            "value date",
            "data",
            "operacijos data",
        ],
    ),
    (
        Field::Description,
        &[
            "description",
            "paaiškinimai",
            "paaiskinimai",
            "details",
            "narrative",
            "memo",
            "payee",
            "merchant",
            "gavėjas",
            "gavejas",
            "name",
        ],
    ),
    (
        Field::Amount,
        &["amount", "suma", "transaction amount", "amt", "value"],
    ),
    (
        Field::Debit,
        &["debit", "debit amount", "withdrawal", "withdrawals", "paid out", "money out"],
    ),
    (
        Field::Credit,
        &["credit", "credit amount", "deposit", "deposits", "paid in", "money in"],
    ),
    (Field::Currency, &["currency", "valiuta", "ccy", "currency code"]),
    (
        Field::Indicator,
        &["d/k", "dk", "debit/credit", "credit/debit", "cr/dr", "dr/cr"],
    ),
];

pub fn aliases(field: Field) -> &'static [&'static str] {
    ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, a)| *a)
        .unwrap_or(&[])
}

/// Find the source column for `field`, returning the column name as written.
pub fn find_column<'a>(columns: &[&'a str], field: Field) -> Option<&'a str> {
    aliases(field).iter().find_map(|alias| {
        columns
            .iter()
            .find(|c| c.trim().to_lowercase() == *alias)
            .copied()
    })
}

/// Where the signed amount comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountColumns {
    /// One signed (or indicator-qualified) amount column
    Single(String),
    /// Separate debit/credit magnitude columns; at least one is present
    Split {
        debit: Option<String>,
        credit: Option<String>,
    },
}

/// Resolved column names for one source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: String,
    pub description: Option<String>,
    pub amount: AmountColumns,
    pub currency: Option<String>,
    pub indicator: Option<String>,
}

impl ColumnMap {
    /// Resolve a source's columns, failing with [`Error::Schema`] when no
    /// alias matches for the date or the amount.
    pub fn resolve(columns: &[&str], source_tag: &str) -> Result<Self> {
        let schema_err = |field| Error::Schema {
            source_tag: source_tag.to_string(),
            field,
            columns: columns.iter().map(|c| c.to_string()).collect(),
        };

        let date = find_column(columns, Field::Date).ok_or_else(|| schema_err(Field::Date))?;

        let amount = match find_column(columns, Field::Amount) {
            Some(col) => AmountColumns::Single(col.to_string()),
            None => {
                let debit = find_column(columns, Field::Debit).map(str::to_string);
                let credit = find_column(columns, Field::Credit).map(str::to_string);
                if debit.is_none() && credit.is_none() {
                    return Err(schema_err(Field::Amount));
                }
                AmountColumns::Split { debit, credit }
            }
        };

        Ok(Self {
            date: date.to_string(),
            description: find_column(columns, Field::Description).map(str::to_string),
            amount,
            currency: find_column(columns, Field::Currency).map(str::to_string),
            indicator: find_column(columns, Field::Indicator).map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_headers_any_case() {
        let cols = ["DATE", " Description ", "Amount", "Currency"];
        let map = ColumnMap::resolve(&cols, "bank").unwrap();
        assert_eq!(map.date, "DATE");
        assert_eq!(map.description.as_deref(), Some(" Description "));
        assert_eq!(map.amount, AmountColumns::Single("Amount".to_string()));
        assert_eq!(map.currency.as_deref(), Some("Currency"));
        assert_eq!(map.indicator, None);
    }

    #[test]
    fn test_revolut_prefers_completed_date() {
        let cols = [
            "Type",
            "Product",
            "Started Date",
            "Completed Date",
            "Description",
            "Amount",
            "Fee",
            "Currency",
            "State",
            "Balance",
        ];
        let map = ColumnMap::resolve(&cols, "Revolut").unwrap();
        assert_eq!(map.date, "Completed Date");
    }

    #[test]
    fn test_swedbank_headers() {
        let cols = [
            "Sąskaitos Nr.",
            "",
            "Data",
            "Gavėjas",
            "Paaiškinimai",
            "Suma",
            "Valiuta",
            "D/K",
        ];
        let map = ColumnMap::resolve(&cols, "Swedbank").unwrap();
        assert_eq!(map.date, "Data");
        assert_eq!(map.description.as_deref(), Some("Paaiškinimai"));
        assert_eq!(map.amount, AmountColumns::Single("Suma".to_string()));
        assert_eq!(map.currency.as_deref(), Some("Valiuta"));
        assert_eq!(map.indicator.as_deref(), Some("D/K"));
    }

    #[test]
    fn test_split_debit_credit() {
        let cols = ["Posted Date", "Memo", "Withdrawal", "Deposit"];
        let map = ColumnMap::resolve(&cols, "cu").unwrap();
        assert_eq!(
            map.amount,
            AmountColumns::Split {
                debit: Some("Withdrawal".to_string()),
                credit: Some("Deposit".to_string()),
            }
        );
    }

    #[test]
    fn test_missing_fields_are_schema_errors() {
        let err = ColumnMap::resolve(&["Description", "Amount"], "x").unwrap_err();
        assert!(matches!(err, Error::Schema { field: Field::Date, .. }));

        let err = ColumnMap::resolve(&["Date", "Description", "Balance"], "x").unwrap_err();
        match err {
            Error::Schema { field, columns, source_tag } => {
                assert_eq!(field, Field::Amount);
                assert_eq!(source_tag, "x");
                assert_eq!(columns, vec!["Date", "Description", "Balance"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_description_is_optional() {
        let map = ColumnMap::resolve(&["date", "amount"], "x").unwrap();
        assert_eq!(map.description, None);
    }
}
