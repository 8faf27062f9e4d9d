//! Known statement layouts and content-based detection.
//!
//! Revolut app/web export:
//!   Type,Product,Started Date,Completed Date,Description,Amount,Fee,Currency,State,Balance
//! Swedbank (LT) account statement:
//!   Sąskaitos Nr.,,Data,Gavėjas,Paaiškinimai,Suma,Valiuta,D/K,Įrašo Nr.,Kodas,Įmokos kodas,Dokumento Nr.

use serde::{Deserialize, Serialize};

use crate::types::RawRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    Revolut,
    Swedbank,
    Generic,
}

const REVOLUT_GROUPS: &[&[&str]] = &[
    &["completed date", "started date"],
    &["type"],
    &["description"],
    &["amount"],
    &["currency"],
];

const SWEDBANK_GROUPS: &[&[&str]] = &[
    &["data", "date"],
    &["suma"],
    &["valiuta", "currency"],
    &["d/k", "dk"],
    &["paaiškinimai", "paaiskinimai"],
];

/// At least one of these must be present before a layout is considered.
const REVOLUT_MARKERS: &[&str] = &["completed date", "started date", "product"];
const SWEDBANK_MARKERS: &[&str] = &["suma", "d/k", "dk", "paaiškinimai", "paaiskinimai"];

impl Layout {
    /// Human-readable name, used as the default source tag
    pub fn name(&self) -> &'static str {
        match self {
            Layout::Revolut => "Revolut",
            Layout::Swedbank => "Swedbank",
            Layout::Generic => "Generic",
        }
    }
}

/// Decide which bank produced `rows` by how many non-empty cells sit under
/// each layout's columns. Revolut wins ties; nothing recognisable is Generic.
pub fn detect_layout(rows: &[RawRow]) -> Layout {
    let Some(first) = rows.first() else {
        return Layout::Generic;
    };
    let columns: Vec<String> = first.columns().map(|c| c.trim().to_lowercase()).collect();

    let has_marker = |markers: &[&str]| markers.iter().any(|m| columns.iter().any(|c| c == *m));

    let revolut = if has_marker(REVOLUT_MARKERS) {
        score(rows, &columns, REVOLUT_GROUPS)
    } else {
        0
    };
    let swedbank = if has_marker(SWEDBANK_MARKERS) {
        score(rows, &columns, SWEDBANK_GROUPS)
    } else {
        0
    };

    match (revolut, swedbank) {
        (0, 0) => Layout::Generic,
        (r, s) if r >= s => Layout::Revolut,
        _ => Layout::Swedbank,
    }
}

fn score(rows: &[RawRow], lower_columns: &[String], groups: &[&[&str]]) -> usize {
    let Some(first) = rows.first() else {
        return 0;
    };
    let names: Vec<&str> = first.columns().collect();

    groups
        .iter()
        .filter_map(|aliases| {
            aliases
                .iter()
                .find_map(|a| lower_columns.iter().position(|c| c == *a))
        })
        .map(|idx| {
            let column = names[idx];
            rows.iter()
                .filter(|r| r.get(column).is_some_and(|v| !v.trim().is_empty()))
                .count()
        })
        .sum()
}
