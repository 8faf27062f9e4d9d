use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

use tally_core::{KpiSummary, YearMonth};
use tally_finance::{RunOutput, ensure_dir, run, write_report_json, write_transactions_csv};
use tally_ingest::SourceInput;

mod config;
mod logging;

use config::{Config, default_config_path, init_config, load_config};

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "tally", version = VERSION, about = "Monthly bank-statement KPIs")]
struct Cli {
    /// Log level (error, warn, info, debug, trace or an EnvFilter directive)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize, categorize and summarize statements for one month
    Report {
        /// Reporting month, YYYY-MM
        #[arg(long)]
        month: YearMonth,

        /// Statement CSV files (repeatable)
        #[arg(long, required = true)]
        csv: Vec<PathBuf>,

        /// Source tag for the CSV at the same position (default: detected bank)
        #[arg(long)]
        bank: Vec<String>,

        /// Config file (default: ./tally.toml, then ~/.tally/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory
        #[arg(long, default_value = "output")]
        out: PathBuf,

        /// Abort on the first malformed row instead of skipping it
        #[arg(long)]
        strict: bool,
    },

    /// Write a starter config
    Init {
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate the config and list categorization rules in match order
    Rules {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Report {
            month,
            csv,
            bank,
            config,
            out,
            strict,
        } => {
            let (cfg, used) = load_config(config.as_deref())?;
            logging::setup_logging(cli.log_level.as_deref().or(cfg.logging.level.as_deref()));
            debug!(config = ?used, "loaded config");
            report(&cfg, month, &csv, &bank, &out, strict)?;
        }

        Command::Init { config } => {
            logging::setup_logging(cli.log_level.as_deref());
            let p = match config {
                Some(p) => p,
                None => default_config_path()?,
            };
            if init_config(&p)? {
                println!("Wrote {}", p.display());
            } else {
                println!("Config already exists: {}", p.display());
            }
        }

        Command::Rules { config } => {
            let (cfg, used) = load_config(config.as_deref())?;
            logging::setup_logging(cli.log_level.as_deref().or(cfg.logging.level.as_deref()));
            list_rules(&cfg, used.as_deref())?;
        }
    }

    Ok(())
}

/// Run one month over `csv`, pairing `banks[i]` with `csv[i]` as the source
/// tag, and write `transactions_<month>.csv` and `report_<month>.json` to `out`.
fn report(
    cfg: &Config,
    month: YearMonth,
    csv: &[PathBuf],
    banks: &[String],
    out: &Path,
    strict: bool,
) -> Result<()> {
    // Fail on bad rules before touching any statement.
    let rules = cfg.rule_set()?;

    if banks.len() > csv.len() {
        bail!("{} --bank values given for {} --csv files", banks.len(), csv.len());
    }

    let mut sources = Vec::with_capacity(csv.len());
    for (i, path) in csv.iter().enumerate() {
        if !path.exists() {
            bail!("CSV not found: {}", path.display());
        }
        let mut src = SourceInput::from_path(path, banks.get(i).map(String::as_str))
            .with_context(|| format!("reading {}", path.display()))?;
        if let Some(sign) = cfg.sign_for(&src.tag) {
            src = src.with_sign(sign);
        }
        println!("Loaded {} rows from {} as {}", src.rows.len(), path.display(), src.tag);
        sources.push(src);
    }

    let output = run(&sources, &rules, month, &cfg.pipeline_options(strict))?;
    print_summary(month, &output);

    ensure_dir(out)?;
    let txn_path = out.join(format!("transactions_{month}.csv"));
    let report_path = out.join(format!("report_{month}.json"));
    write_transactions_csv(&txn_path, &output.transactions)?;
    write_report_json(&report_path, &output.report)?;

    println!("\nWrote {}", txn_path.display());
    println!("Wrote {}", report_path.display());
    Ok(())
}

fn print_summary(month: YearMonth, output: &RunOutput) {
    let dropped = output.dropped_summary();
    if !dropped.is_empty() {
        println!("\nDropped {} rows:", output.diagnostics.len());
        for (reason, count) in &dropped {
            println!("  {count:>5}  {reason}");
        }
    }

    for w in &output.warnings {
        println!("\nwarning: {w}");
    }

    print_kpis(month, &output.summary);
}

fn print_kpis(month: YearMonth, k: &KpiSummary) {
    println!("\n# {month}: {} transactions\n", k.transaction_count());
    println!("{:<24}{:>12}", "Income", k.total_income.round_dp(2).to_string());
    println!("{:<24}{:>12}", "Expense", k.total_expense.round_dp(2).to_string());
    println!("{:<24}{:>12}", "Net", k.net.round_dp(2).to_string());

    if k.is_empty() {
        return;
    }

    println!("\n{:<24}{:>12}{:>8}", "Category", "Sum", "Count");
    for (label, g) in &k.by_category {
        println!("{:<24}{:>12}{:>8}", label, g.sum.round_dp(2).to_string(), g.count);
    }

    println!("\n{:<24}{:>12}{:>8}", "Bank", "Sum", "Count");
    for (bank, g) in &k.by_bank {
        println!("{:<24}{:>12}{:>8}", bank, g.sum.round_dp(2).to_string(), g.count);
    }
}

fn list_rules(cfg: &Config, used: Option<&Path>) -> Result<()> {
    let rules = cfg.rule_set()?;
    match used {
        Some(p) => println!("Config: {}", p.display()),
        None => println!("Config: built-in defaults"),
    }
    println!(
        "{} rules, case {}, default category {:?}\n",
        rules.rules().len(),
        if rules.case_insensitive() { "insensitive" } else { "sensitive" },
        rules.default_category()
    );
    for (i, r) in rules.rules().iter().enumerate() {
        let kind = match r.kind() {
            tally_core::RuleKind::Expense => "expense",
            tally_core::RuleKind::Income => "income",
        };
        println!("{:>3}. {:<20} [{kind}] {}", i + 1, r.label(), r.match_terms().join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourceSection;
    use std::fs;
    use tally_ingest::SignConvention;

    const CHECKING: &str = "Date,Description,Amount\n\
        2025-11-05,LIDL VILNIUS,-15.40\n\
        2025-11-06,ACME PAYROLL,1000.00\n\
        2025-12-01,LIDL VILNIUS,-3.00\n";

    // card export lists purchases as positive amounts
    const CARD: &str = "Date,Description,Amount\n\
        2025-11-07,CIRCLE K VILNIUS,52.10\n\
        2025-11-20,PAYMENT THANK YOU,-50.00\n";

    fn november() -> YearMonth {
        "2025-11".parse().unwrap()
    }

    fn amex_config() -> Config {
        let mut cfg = Config::starter();
        cfg.normalize.sources = vec![SourceSection {
            tag: "Amex".to_string(),
            sign: SignConvention::ExpensesPositive,
        }];
        cfg
    }

    fn write_statements(dir: &Path) -> Vec<PathBuf> {
        let checking = dir.join("checking.csv");
        let card = dir.join("card.csv");
        fs::write(&checking, CHECKING).unwrap();
        fs::write(&card, CARD).unwrap();
        vec![checking, card]
    }

    fn exported_rows(out: &Path) -> Vec<String> {
        let text = fs::read_to_string(out.join("transactions_2025-11.csv")).unwrap();
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_report_writes_month_files_with_bank_tags() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_statements(dir.path());
        let out = dir.path().join("out");
        let banks = vec!["Checking".to_string(), "amex".to_string()];

        report(&amex_config(), november(), &csv, &banks, &out, false).unwrap();

        let rows = exported_rows(&out);
        assert_eq!(rows[0], "date,description,amount,currency,bank,category");
        assert_eq!(rows.len(), 5);
        assert!(rows.contains(&"2025-11-05,LIDL VILNIUS,-15.40,EUR,Checking,groceries".into()));
        assert!(rows.contains(&"2025-11-07,CIRCLE K VILNIUS,-52.10,EUR,amex,fuel".into()));
        assert!(rows.iter().any(|r| r.starts_with("2025-11-20,PAYMENT THANK YOU,50.00,EUR,amex")));

        let json = fs::read_to_string(out.join("report_2025-11.json")).unwrap();
        let report: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(report["month"], "2025-11");
        assert_eq!(report["kpis"]["total_expense"], "67.50");
        assert_eq!(report["source_summary"]["amex"], 2);
        assert_eq!(report["source_summary"]["Checking"], 2);
    }

    #[test]
    fn test_unpaired_csv_keeps_detected_tag() {
        let dir = tempfile::tempdir().unwrap();
        let mut csv = write_statements(dir.path());
        csv.reverse();
        let out = dir.path().join("out");

        report(&amex_config(), november(), &csv, &["Amex".to_string()], &out, false).unwrap();

        let rows = exported_rows(&out);
        assert!(rows.contains(&"2025-11-07,CIRCLE K VILNIUS,-52.10,EUR,Amex,fuel".into()));
        assert!(rows.contains(&"2025-11-05,LIDL VILNIUS,-15.40,EUR,checking,groceries".into()));
    }

    #[test]
    fn test_without_sign_override_card_is_read_as_is() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_statements(dir.path());
        let out = dir.path().join("out");
        let banks = vec!["Checking".to_string(), "Amex".to_string()];

        report(&Config::starter(), november(), &csv, &banks, &out, false).unwrap();

        let rows = exported_rows(&out);
        assert!(rows.iter().any(|r| r.starts_with("2025-11-07,CIRCLE K VILNIUS,52.10,EUR,Amex")));
    }

    #[test]
    fn test_more_banks_than_csv_files_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_statements(dir.path());
        let out = dir.path().join("out");
        let banks: Vec<String> = ["a", "b", "c"].iter().map(|b| b.to_string()).collect();

        let err = report(&amex_config(), november(), &csv, &banks, &out, false).unwrap_err();
        assert!(err.to_string().contains("3 --bank values given for 2 --csv files"));
        assert!(!out.exists());
    }

    #[test]
    fn test_version_carries_build_stamp() {
        let stamp = VERSION
            .strip_prefix(concat!(env!("CARGO_PKG_VERSION"), " ("))
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap();
        assert!(!stamp.is_empty());
    }

    #[test]
    fn test_missing_csv_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let csv = vec![dir.path().join("nope.csv")];
        let out = dir.path().join("out");

        let err = report(&amex_config(), november(), &csv, &[], &out, false).unwrap_err();
        assert!(err.to_string().starts_with("CSV not found"));
    }
}
