use serde::{Deserialize, Serialize};
use std::fmt;

use tally_core::{Error, Field, Transaction};

/// One raw statement row: column name -> cell text, in file column order.
///
/// Column names are whatever the source wrote; nothing about them is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRow {
    /// 1-based line in the source file (0 when the row did not come from a file)
    pub line: usize,
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn new<K, V>(line: usize, cells: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            line,
            cells: cells.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Column names in source order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    /// Cell under the exact column name
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.trim().is_empty())
    }
}

/// How a source writes the sign of its amounts when nothing else says so
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SignConvention {
    /// Expenses negative, income positive (the canonical form)
    #[default]
    ExpensesNegative,
    /// Charges positive, refunds/payments negative (credit card style)
    ExpensesPositive,
}

/// What to do with a row whose date or amount cannot be parsed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Drop the row, record a diagnostic, keep going
    #[default]
    BestEffort,
    /// Abort on the first malformed row
    Strict,
}

/// Settings threaded through normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub default_currency: String,
    pub sign: SignConvention,
    pub policy: ErrorPolicy,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            default_currency: "EUR".to_string(),
            sign: SignConvention::default(),
            policy: ErrorPolicy::default(),
        }
    }
}

/// A row excluded from the normalized set, and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDiagnostic {
    pub source_tag: String,
    pub line: usize,
    pub field: Field,
    pub value: String,
    pub reason: String,
}

impl RowDiagnostic {
    pub fn into_error(self) -> Error {
        Error::Parse {
            source_tag: self.source_tag,
            line: self.line,
            field: self.field,
            value: self.value,
            reason: self.reason,
        }
    }
}

impl fmt::Display for RowDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} line {}: {} {:?} ({})",
            self.source_tag, self.line, self.field, self.value, self.reason
        )
    }
}

/// Output of the normalizer for one source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub transactions: Vec<Transaction>,
    pub diagnostics: Vec<RowDiagnostic>,
}

/// Raw rows of one statement file plus how to treat them
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInput {
    pub tag: String,
    pub rows: Vec<RawRow>,
    /// Per-source override; `None` uses the run-wide convention
    pub sign: Option<SignConvention>,
}

impl SourceInput {
    pub fn new(tag: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            tag: tag.into(),
            rows,
            sign: None,
        }
    }

    pub fn with_sign(mut self, sign: SignConvention) -> Self {
        self.sign = Some(sign);
        self
    }
}
