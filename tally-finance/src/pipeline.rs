//! Pipeline orchestrator: normalize every source, categorize, filter to the
//! reporting month, aggregate.
//!
//! Stages are pure transformations over owned vectors; the only state is the
//! diagnostics collected from best-effort normalization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use tally_core::{Error, KpiSummary, Result, RuleSet, Transaction, YearMonth};
use tally_ingest::{
    ErrorPolicy, NormalizeOptions, RowDiagnostic, SignConvention, SourceInput, normalize,
};

use crate::category_rules::categorize;
use crate::cleaning::dedupe;
use crate::kpis::{MonthlyReport, ReportOptions, aggregate};
use crate::month_filter::filter_month;

/// Run-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOptions {
    #[serde(default)]
    pub policy: ErrorPolicy,
    /// Sign convention for sources that do not carry their own
    #[serde(default)]
    pub sign: SignConvention,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default)]
    pub dedupe: bool,
    #[serde(default)]
    pub report: ReportOptions,
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            policy: ErrorPolicy::default(),
            sign: SignConvention::default(),
            default_currency: default_currency(),
            dedupe: false,
            report: ReportOptions::default(),
        }
    }
}

impl PipelineOptions {
    fn normalize_options(&self, source: &SourceInput) -> NormalizeOptions {
        NormalizeOptions {
            default_currency: self.default_currency.clone(),
            sign: source.sign.unwrap_or(self.sign),
            policy: self.policy,
        }
    }
}

/// Everything one run produces
#[derive(Debug)]
pub struct RunOutput {
    /// Categorized transactions of the reporting month, in source order
    pub transactions: Vec<Transaction>,
    pub summary: KpiSummary,
    pub report: MonthlyReport,
    /// Rows excluded during normalization
    pub diagnostics: Vec<RowDiagnostic>,
    /// Non-fatal conditions, e.g. [`Error::NoDataForMonth`]
    pub warnings: Vec<Error>,
}

impl RunOutput {
    /// Dropped rows counted per reason
    pub fn dropped_summary(&self) -> BTreeMap<String, usize> {
        dropped_by_reason(&self.diagnostics)
    }
}

/// Run the full pipeline for `month`.
///
/// Schema and config errors abort. Malformed rows abort under
/// [`ErrorPolicy::Strict`] and are reported in `diagnostics` otherwise. An
/// empty month is not an error: the report is produced with zero totals and
/// a warning.
pub fn run(
    sources: &[SourceInput],
    rules: &RuleSet,
    month: YearMonth,
    opts: &PipelineOptions,
) -> Result<RunOutput> {
    if sources.is_empty() {
        return Err(Error::EmptyInput);
    }

    let mut normalized = Vec::new();
    let mut diagnostics = Vec::new();
    for source in sources {
        let out = normalize(&source.rows, &source.tag, &opts.normalize_options(source))?;
        normalized.extend(out.transactions);
        diagnostics.extend(out.diagnostics);
    }

    let dropped = dropped_by_reason(&diagnostics);
    if !diagnostics.is_empty() {
        warn!(dropped = diagnostics.len(), "rows excluded during normalization");
        for (reason, count) in &dropped {
            warn!(count, "  {reason}");
        }
    }

    let categorized = categorize(&normalized, rules);
    let mut transactions = filter_month(&categorized, month);

    if opts.dedupe {
        let (kept, removed) = dedupe(&transactions);
        if removed > 0 {
            info!(removed, "removed duplicate transactions");
        }
        transactions = kept;
    }

    let mut warnings = Vec::new();
    if transactions.is_empty() {
        warn!(%month, total = categorized.len(), "no transactions in reporting month");
        warnings.push(Error::NoDataForMonth(month));
    }

    let summary = aggregate(&transactions);
    let mut report =
        MonthlyReport::build(month, &transactions, summary.clone(), rules, &opts.report);
    report.dropped_rows = dropped;

    info!(
        %month,
        transactions = transactions.len(),
        income = %summary.total_income,
        expense = %summary.total_expense,
        net = %summary.net,
        "pipeline finished"
    );

    Ok(RunOutput {
        transactions,
        summary,
        report,
        diagnostics,
        warnings,
    })
}

/// Group diagnostics by "field: reason"
pub fn dropped_by_reason(diagnostics: &[RowDiagnostic]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for d in diagnostics {
        *counts.entry(format!("{}: {}", d.field, d.reason)).or_insert(0) += 1;
    }
    counts
}
