//! Record normalizer: raw statement rows -> canonical [`Transaction`]s.

use rust_decimal::Decimal;
use tracing::{debug, info};

use tally_core::{Field, Result, Transaction};

use crate::columns::{AmountColumns, ColumnMap};
use crate::parsers::{parse_amount, parse_date, parse_indicator};
use crate::types::{
    ErrorPolicy, NormalizeOptions, Normalized, RawRow, RowDiagnostic, SignConvention,
};

/// Normalize one source's rows, tagging every transaction with `source_tag`.
///
/// Columns are resolved once from the first row. A missing date or amount
/// column fails the whole source with a schema error. Malformed cells are
/// collected as diagnostics under [`ErrorPolicy::BestEffort`], or returned as
/// the first parse error under [`ErrorPolicy::Strict`].
pub fn normalize(rows: &[RawRow], source_tag: &str, opts: &NormalizeOptions) -> Result<Normalized> {
    let Some(first) = rows.first() else {
        return Ok(Normalized::default());
    };

    let columns: Vec<&str> = first.columns().collect();
    let map = ColumnMap::resolve(&columns, source_tag)?;
    debug!(source = source_tag, ?map, "resolved columns");

    let mut out = Normalized::default();

    for row in rows.iter().filter(|r| !r.is_blank()) {
        match normalize_row(row, &map, source_tag, opts) {
            Ok(txn) => out.transactions.push(txn),
            Err(diag) => {
                if opts.policy == ErrorPolicy::Strict {
                    return Err(diag.into_error());
                }
                debug!(
                    source = source_tag,
                    line = diag.line,
                    reason = %diag.reason,
                    "dropping row"
                );
                out.diagnostics.push(diag);
            }
        }
    }

    info!(
        source = source_tag,
        kept = out.transactions.len(),
        dropped = out.diagnostics.len(),
        "normalized source"
    );
    Ok(out)
}

fn normalize_row(
    row: &RawRow,
    map: &ColumnMap,
    source_tag: &str,
    opts: &NormalizeOptions,
) -> std::result::Result<Transaction, RowDiagnostic> {
    let diag = |field: Field, value: &str, reason: &str| RowDiagnostic {
        source_tag: source_tag.to_string(),
        line: row.line,
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    };
    let cell = |column: &str| row.get(column).unwrap_or("").trim();

    let date_raw = cell(&map.date);
    if date_raw.is_empty() {
        return Err(diag(Field::Date, date_raw, "empty value"));
    }
    let date = parse_date(date_raw)
        .ok_or_else(|| diag(Field::Date, date_raw, "no known date format"))?;

    let amount = match &map.amount {
        AmountColumns::Single(column) => {
            let raw = cell(column);
            let value = parse_amount(raw).map_err(|e| diag(Field::Amount, raw, &e))?;

            let indicator = match &map.indicator {
                Some(col) => {
                    let raw = cell(col);
                    parse_indicator(raw).map_err(|e| diag(Field::Indicator, raw, &e))?
                }
                None => None,
            };

            match indicator {
                Some(direction) => direction.apply(value),
                None => apply_convention(value, opts.sign),
            }
        }
        AmountColumns::Split { debit, credit } => {
            let debit = parse_optional(debit.as_deref().map(cell))
                .map_err(|(raw, e)| diag(Field::Debit, raw, &e))?;
            let credit = parse_optional(credit.as_deref().map(cell))
                .map_err(|(raw, e)| diag(Field::Credit, raw, &e))?;
            if debit.is_none() && credit.is_none() {
                return Err(diag(Field::Amount, "", "neither debit nor credit set"));
            }
            credit.unwrap_or_default().abs() - debit.unwrap_or_default().abs()
        }
    };

    let currency = map
        .currency
        .as_deref()
        .map(cell)
        .filter(|c| !c.is_empty())
        .map(str::to_uppercase)
        .unwrap_or_else(|| opts.default_currency.clone());

    let description = map.description.as_deref().map(cell).unwrap_or("");

    Ok(Transaction::new(date, description, amount, currency, source_tag))
}

fn apply_convention(amount: Decimal, sign: SignConvention) -> Decimal {
    match sign {
        SignConvention::ExpensesNegative => amount,
        SignConvention::ExpensesPositive => -amount,
    }
}

/// Empty or absent cells are `None`; anything else must parse.
fn parse_optional(raw: Option<&str>) -> std::result::Result<Option<Decimal>, (&str, String)> {
    match raw {
        None | Some("") => Ok(None),
        Some(s) => parse_amount(s).map(Some).map_err(|e| (s, e)),
    }
}
