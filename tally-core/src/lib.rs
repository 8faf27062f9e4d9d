//! tally-core: canonical types shared by the statement pipeline

pub mod error;
pub mod finance;
pub mod kpi;
pub mod month;
pub mod rules;

pub use error::{Error, Result};
pub use finance::{Field, Transaction, UNCATEGORIZED};
pub use kpi::{GroupTotal, KpiSummary};
pub use month::YearMonth;
pub use rules::{CategoryRule, RuleConfig, RuleKind, RuleSet, RuleSetConfig};
