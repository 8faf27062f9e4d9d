//! KPI aggregation and the report tables built on top of it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use tally_core::{GroupTotal, KpiSummary, RuleSet, Transaction, YearMonth};

/// Single pass over `txns`: sign-partitioned totals plus per-category and
/// per-bank sums and counts. Zero amounts count but add nothing.
pub fn aggregate(txns: &[Transaction]) -> KpiSummary {
    let mut summary = KpiSummary::default();

    for t in txns {
        if t.is_income() {
            summary.total_income += t.amount;
        } else if t.is_expense() {
            summary.total_expense += t.amount.abs();
        }
        summary
            .by_category
            .entry(t.category_label().to_string())
            .or_default()
            .add(t.amount);
        summary.by_bank.entry(t.bank.clone()).or_default().add(t.amount);
    }

    summary.net = summary.total_income - summary.total_expense;
    summary
}

/// Sizes and exclusions for the report tables
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportOptions {
    #[serde(default = "default_top_merchants")]
    pub top_merchants: usize,
    #[serde(default = "default_uncategorized_limit")]
    pub uncategorized_limit: usize,
    /// Categories left out of the average daily spend (e.g. investments)
    #[serde(default)]
    pub exclude_from_daily: Vec<String>,
    /// Categories whose outflows are money moved into investments
    #[serde(default)]
    pub investment_categories: Vec<String>,
}

fn default_top_merchants() -> usize {
    15
}

fn default_uncategorized_limit() -> usize {
    50
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_merchants: default_top_merchants(),
            uncategorized_limit: default_uncategorized_limit(),
            exclude_from_daily: Vec::new(),
            investment_categories: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    /// Absolute expense
    pub amount: Decimal,
    pub pct: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IncomeShare {
    pub source: String,
    pub amount: Decimal,
    pub pct: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MerchantTotal {
    pub merchant: String,
    /// Signed (negative) expense sum
    pub sum: Decimal,
    pub count: usize,
}

/// Rendering contract: everything the report template consumes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyReport {
    pub month: YearMonth,
    pub kpis: KpiSummary,
    pub expense_categories: Vec<CategoryShare>,
    pub income_sources: Vec<IncomeShare>,
    pub top_merchants: Vec<MerchantTotal>,
    pub uncategorized: Vec<Transaction>,
    pub avg_daily_spend: Decimal,
    /// Absolute net amount booked to investment categories
    pub total_invested: Decimal,
    /// Investment rows per description, sums absolute
    pub investments: Vec<MerchantTotal>,
    pub source_summary: BTreeMap<String, usize>,
    /// Rows dropped during normalization, counted per reason
    #[serde(default)]
    pub dropped_rows: BTreeMap<String, usize>,
}

/// Bucket for positive amounts not claimed by any income rule
pub const OTHER_INCOME: &str = "Other";

impl MonthlyReport {
    pub fn build(
        month: YearMonth,
        txns: &[Transaction],
        kpis: KpiSummary,
        rules: &RuleSet,
        opts: &ReportOptions,
    ) -> Self {
        let source_summary = kpis
            .by_bank
            .iter()
            .map(|(bank, g)| (bank.clone(), g.count))
            .collect();

        Self {
            month,
            expense_categories: expense_categories(txns),
            income_sources: income_sources(txns, rules),
            top_merchants: top_merchants(txns, opts.top_merchants),
            uncategorized: uncategorized(txns, rules.default_category(), opts.uncategorized_limit),
            avg_daily_spend: avg_daily_spend(txns, month, &opts.exclude_from_daily),
            total_invested: total_invested(txns, &opts.investment_categories),
            investments: investments(txns, &opts.investment_categories),
            source_summary,
            dropped_rows: BTreeMap::new(),
            kpis,
        }
    }
}

/// Expense share per category, largest first.
pub fn expense_categories(txns: &[Transaction]) -> Vec<CategoryShare> {
    let mut groups: HashMap<&str, GroupTotal> = HashMap::new();
    for t in txns.iter().filter(|t| t.is_expense()) {
        groups.entry(t.category_label()).or_default().add(t.abs_amount());
    }
    let total: Decimal = groups.values().map(|g| g.sum).sum();

    let mut rows: Vec<CategoryShare> = groups
        .into_iter()
        .map(|(category, g)| CategoryShare {
            category: category.to_string(),
            amount: g.sum,
            pct: percent(g.sum, total),
            count: g.count,
        })
        .collect();
    rows.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.category.cmp(&b.category)));
    rows
}

/// Income per income-source rule, with everything else under [`OTHER_INCOME`].
pub fn income_sources(txns: &[Transaction], rules: &RuleSet) -> Vec<IncomeShare> {
    let labels: HashSet<&str> = rules.income_labels().collect();
    let mut sums: HashMap<&str, Decimal> = HashMap::new();

    for t in txns.iter().filter(|t| t.is_income()) {
        let label = t.category_label();
        let bucket = if labels.contains(label) { label } else { OTHER_INCOME };
        *sums.entry(bucket).or_default() += t.amount;
    }
    let total: Decimal = sums.values().copied().sum();

    let mut rows: Vec<IncomeShare> = sums
        .into_iter()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(source, amount)| IncomeShare {
            source: source.to_string(),
            amount,
            pct: percent(amount, total),
        })
        .collect();
    rows.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.source.cmp(&b.source)));
    rows
}

/// Expense totals grouped by description, top `n` by absolute sum.
pub fn top_merchants(txns: &[Transaction], n: usize) -> Vec<MerchantTotal> {
    let mut groups: HashMap<&str, GroupTotal> = HashMap::new();
    for t in txns.iter().filter(|t| t.is_expense()) {
        groups.entry(t.description.as_str()).or_default().add(t.amount);
    }

    let mut rows: Vec<MerchantTotal> = groups
        .into_iter()
        .map(|(merchant, g)| MerchantTotal {
            merchant: merchant.to_string(),
            sum: g.sum,
            count: g.count,
        })
        .collect();
    rows.sort_by(|a, b| {
        b.sum
            .abs()
            .cmp(&a.sum.abs())
            .then_with(|| a.merchant.cmp(&b.merchant))
    });
    rows.truncate(n);
    rows
}

/// Expenses left in the default category, most negative first.
pub fn uncategorized(
    txns: &[Transaction],
    default_category: &str,
    limit: usize,
) -> Vec<Transaction> {
    let mut rows: Vec<Transaction> = txns
        .iter()
        .filter(|t| t.is_expense() && t.category_label() == default_category)
        .cloned()
        .collect();
    rows.sort_by(|a, b| a.amount.cmp(&b.amount));
    rows.truncate(limit);
    rows
}

/// Average spend per calendar day of `month`, excluding the given categories.
pub fn avg_daily_spend(txns: &[Transaction], month: YearMonth, exclude: &[String]) -> Decimal {
    let spent: Decimal = txns
        .iter()
        .filter(|t| t.is_expense() && !exclude.iter().any(|c| c == t.category_label()))
        .map(|t| t.abs_amount())
        .sum();
    (spent / Decimal::from(month.days())).round_dp(2)
}

fn is_investment(t: &Transaction, categories: &[String]) -> bool {
    categories.iter().any(|c| c == t.category_label())
}

/// Absolute value of the signed sum over investment categories. Sales and
/// purchases within the month offset each other.
pub fn total_invested(txns: &[Transaction], categories: &[String]) -> Decimal {
    txns.iter()
        .filter(|t| is_investment(t, categories))
        .map(|t| t.amount)
        .sum::<Decimal>()
        .abs()
}

/// Investment rows grouped by description, largest absolute sum first.
pub fn investments(txns: &[Transaction], categories: &[String]) -> Vec<MerchantTotal> {
    let mut groups: HashMap<&str, GroupTotal> = HashMap::new();
    for t in txns.iter().filter(|t| is_investment(t, categories)) {
        groups.entry(t.description.as_str()).or_default().add(t.amount);
    }

    let mut rows: Vec<MerchantTotal> = groups
        .into_iter()
        .map(|(merchant, g)| MerchantTotal {
            merchant: merchant.to_string(),
            sum: g.sum.abs(),
            count: g.count,
        })
        .filter(|m| !m.sum.is_zero())
        .collect();
    rows.sort_by(|a, b| b.sum.cmp(&a.sum).then_with(|| a.merchant.cmp(&b.merchant)));
    rows
}

fn percent(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        Decimal::ZERO
    } else {
        (part * Decimal::ONE_HUNDRED / total).round_dp(1)
    }
}
