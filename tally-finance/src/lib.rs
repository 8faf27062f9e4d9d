//! tally-finance: categorization, month filtering, KPI aggregation and the
//! pipeline that ties them together.

pub mod category_rules;
pub mod cleaning;
pub mod export;
pub mod kpis;
pub mod month_filter;
pub mod pipeline;

pub use category_rules::categorize;
pub use cleaning::dedupe;
pub use export::{ensure_dir, write_report_json, write_transactions_csv};
pub use kpis::{
    CategoryShare, IncomeShare, MerchantTotal, MonthlyReport, OTHER_INCOME, ReportOptions,
    aggregate,
};
pub use month_filter::filter_month;
pub use pipeline::{PipelineOptions, RunOutput, dropped_by_reason, run};
