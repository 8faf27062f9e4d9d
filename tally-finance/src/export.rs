//! Writers for the run's outputs: the transaction table and the report document.

use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use tally_core::{Error, Result, Transaction};

use crate::kpis::MonthlyReport;

#[derive(Serialize)]
struct CsvRow<'a> {
    date: String,
    description: &'a str,
    amount: String,
    currency: &'a str,
    bank: &'a str,
    category: &'a str,
}

/// Write `transactions` as CSV with the columns
/// `date,description,amount,currency,bank,category`.
pub fn write_transactions_csv(path: impl AsRef<Path>, transactions: &[Transaction]) -> Result<()> {
    let path = path.as_ref();
    let csv_err = |source| Error::Csv {
        path: path.to_path_buf(),
        source,
    };

    // Header is written by hand so an empty month still gets one.
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_err)?;
    wtr.write_record(["date", "description", "amount", "currency", "bank", "category"])
        .map_err(csv_err)?;

    for t in transactions {
        wtr.serialize(CsvRow {
            date: t.date.format("%Y-%m-%d").to_string(),
            description: &t.description,
            amount: t.amount.to_string(),
            currency: &t.currency,
            bank: &t.bank,
            category: t.category_label(),
        })
        .map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| io_err(path, e))
}

/// Write the report as pretty-printed JSON.
pub fn write_report_json(path: impl AsRef<Path>, report: &MonthlyReport) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;
    let mut file = File::create(path).map_err(|e| io_err(path, e))?;
    file.write_all(json.as_bytes())
        .and_then(|_| file.write_all(b"\n"))
        .map_err(|e| io_err(path, e))
}

/// Create `dir` (and parents) if missing.
pub fn ensure_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|e| io_err(dir, e))
}

fn io_err(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpis::{ReportOptions, aggregate};
    use chrono::NaiveDate;
    use tally_core::{RuleSet, RuleSetConfig, YearMonth};

    fn txns() -> Vec<Transaction> {
        let d = |day| NaiveDate::from_ymd_opt(2025, 11, day).unwrap();
        vec![
            Transaction::new(d(5), "LIDL, VILNIUS", "-15.40".parse().unwrap(), "EUR", "Swedbank")
                .with_category("groceries"),
            Transaction::new(
                d(6),
                "EUKLIDO AKADEMIJA",
                "40.00".parse().unwrap(),
                "EUR",
                "Swedbank",
            ),
        ]
    }

    #[test]
    fn test_csv_columns_and_quoting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transactions_2025-11.csv");
        write_transactions_csv(&path, &txns()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "date,description,amount,currency,bank,category");
        assert_eq!(lines[1], "2025-11-05,\"LIDL, VILNIUS\",-15.40,EUR,Swedbank,groceries");
        assert_eq!(lines[2], "2025-11-06,EUKLIDO AKADEMIJA,40.00,EUR,Swedbank,uncategorized");
    }

    #[test]
    fn test_csv_empty_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_transactions_csv(&path, &[]).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap().trim_end(),
            "date,description,amount,currency,bank,category"
        );
    }

    #[test]
    fn test_report_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let rules = RuleSet::new(RuleSetConfig::default()).unwrap();
        let txns = txns();
        let month = YearMonth::new(2025, 11).unwrap();
        let opts = ReportOptions::default();
        let report = MonthlyReport::build(month, &txns, aggregate(&txns), &rules, &opts);
        write_report_json(&path, &report).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["month"], "2025-11");
        assert_eq!(value["kpis"]["net"], "24.60");
        assert_eq!(value["kpis"]["by_category"]["groceries"]["count"], 1);
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let err = write_transactions_csv("/definitely/not/here/x.csv", &[]).unwrap_err();
        assert!(matches!(err, Error::Csv { .. } | Error::Io { .. }));
    }
}
