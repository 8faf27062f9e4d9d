use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tally_core::{RuleConfig, RuleKind, RuleSet, RuleSetConfig};
use tally_finance::{PipelineOptions, ReportOptions};
use tally_ingest::{ErrorPolicy, SignConvention};

pub const LOCAL_CONFIG: &str = "tally.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub normalize: NormalizeSection,
    #[serde(default)]
    pub categorize: RuleSetConfig,
    #[serde(default)]
    pub report: ReportSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizeSection {
    #[serde(default = "default_currency")]
    pub default_currency: String,
    #[serde(default)]
    pub error_policy: ErrorPolicy,
    /// Convention for sources without an override below
    #[serde(default)]
    pub sign: SignConvention,
    #[serde(default)]
    pub sources: Vec<SourceSection>,
}

/// Per-source sign override, matched on the source tag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSection {
    pub tag: String,
    pub sign: SignConvention,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSection {
    #[serde(default = "default_true")]
    pub dedupe: bool,
    #[serde(default = "default_top_merchants")]
    pub top_merchants: usize,
    #[serde(default = "default_uncategorized_limit")]
    pub uncategorized_limit: usize,
    #[serde(default)]
    pub exclude_from_daily: Vec<String>,
    #[serde(default)]
    pub investment_categories: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingSection {
    pub level: Option<String>,
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_true() -> bool {
    true
}

fn default_top_merchants() -> usize {
    ReportOptions::default().top_merchants
}

fn default_uncategorized_limit() -> usize {
    ReportOptions::default().uncategorized_limit
}

impl Default for NormalizeSection {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            error_policy: ErrorPolicy::default(),
            sign: SignConvention::default(),
            sources: Vec::new(),
        }
    }
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            dedupe: true,
            top_merchants: default_top_merchants(),
            uncategorized_limit: default_uncategorized_limit(),
            exclude_from_daily: Vec::new(),
            investment_categories: Vec::new(),
        }
    }
}

impl Config {
    /// What `tally init` writes: defaults plus a handful of example rules.
    pub fn starter() -> Self {
        let rule = |label: &str, kind, terms: &[&str]| RuleConfig {
            label: label.to_string(),
            kind,
            match_terms: terms.iter().map(|t| t.to_string()).collect(),
        };

        let mut cfg = Config::default();
        cfg.categorize.rules = vec![
            rule("groceries", RuleKind::Expense, &["lidl", "maxima", "rimi", "iki"]),
            rule("fuel", RuleKind::Expense, &["circle k", "viada", "neste"]),
            rule("transport", RuleKind::Expense, &["bolt", "uber", "trafi"]),
            rule("investment", RuleKind::Expense, &["etf", "brokerage"]),
            rule("salary", RuleKind::Income, &["salary", "payroll", "atlyginimas"]),
            rule("tutoring", RuleKind::Income, &["euklido akademija"]),
        ];
        cfg.report.exclude_from_daily = vec!["investment".to_string()];
        cfg.report.investment_categories = vec!["investment".to_string()];
        cfg
    }

    /// Validate `[categorize]` into a rule set.
    pub fn rule_set(&self) -> Result<RuleSet> {
        RuleSet::try_from(self.categorize.clone()).context("invalid [categorize] section")
    }

    pub fn sign_for(&self, tag: &str) -> Option<SignConvention> {
        self.normalize
            .sources
            .iter()
            .find(|s| s.tag.eq_ignore_ascii_case(tag))
            .map(|s| s.sign)
    }

    /// Pipeline options; `strict` forces [`ErrorPolicy::Strict`].
    pub fn pipeline_options(&self, strict: bool) -> PipelineOptions {
        PipelineOptions {
            policy: if strict {
                ErrorPolicy::Strict
            } else {
                self.normalize.error_policy
            },
            sign: self.normalize.sign,
            default_currency: self.normalize.default_currency.clone(),
            dedupe: self.report.dedupe,
            report: ReportOptions {
                top_merchants: self.report.top_merchants,
                uncategorized_limit: self.report.uncategorized_limit,
                exclude_from_daily: self.report.exclude_from_daily.clone(),
                investment_categories: self.report.investment_categories.clone(),
            },
        }
    }
}

pub fn tally_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join(".tally"))
}

/// `./tally.toml` when present, else `~/.tally/config.toml`.
pub fn default_config_path() -> Result<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG);
    if local.exists() {
        return Ok(local);
    }
    Ok(tally_home()?.join("config.toml"))
}

/// Load `explicit` (which must exist) or the default path (which may not).
pub fn load_config(explicit: Option<&Path>) -> Result<(Config, Option<PathBuf>)> {
    let p = match explicit {
        Some(p) if !p.exists() => bail!("config not found: {}", p.display()),
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if !p.exists() {
        return Ok((Config::default(), None));
    }
    let cfg = read_config(&p)?;
    Ok((cfg, Some(p)))
}

pub fn read_config(p: &Path) -> Result<Config> {
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(p: &Path, cfg: &Config) -> Result<()> {
    if let Some(dir) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// Write the starter config unless something is already there.
/// Returns whether a file was written.
pub fn init_config(p: &Path) -> Result<bool> {
    if p.exists() {
        return Ok(false);
    }
    save_config(p, &Config::starter())?;
    Ok(true)
}
