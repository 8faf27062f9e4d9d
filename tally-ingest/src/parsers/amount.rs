//! Money-cell parsing.
//!
//! Handles what statement exports actually contain:
//!   -15.40      15,40      1 234,56 €      €1,234.56
//!   (15.40)     15.40-     EUR 40.00       1.234.567,00

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(?:\.\d+)?$").expect("invalid number regex"))
}

/// Optional ISO currency code before or after the number: `EUR 40.00`, `40.00USD`
fn currency_code_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[A-Z]{3}\s*)?(.*?)(?:\s*[A-Z]{3})?$").expect("invalid currency code regex")
    })
}

/// Characters dropped from a cell besides whitespace (NBSP included)
const IGNORED: &[char] = &['\'', '\u{2019}', '€', '$', '£'];

/// Magnitudes at or above this are rejected so sums can never overflow.
const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// Parse an amount cell into a signed decimal.
///
/// Whitespace, apostrophe groupings, `€$£` and a three-letter currency code
/// are stripped; any other letter makes the cell "not a number". The decimal
/// separator is the last of `.`/`,` when both appear; a lone `,` is decimal
/// only when followed by one or two digits.
pub fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }

    let body = currency_code_re()
        .captures(trimmed)
        .and_then(|c| c.get(1))
        .map_or(trimmed, |m| m.as_str());

    let mut cleaned = String::with_capacity(body.len());
    for c in body.chars() {
        if c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+' | '(' | ')') {
            cleaned.push(c);
        } else if !(c.is_whitespace() || IGNORED.contains(&c)) {
            return Err("not a number".to_string());
        }
    }
    if cleaned.is_empty() {
        return Err("not a number".to_string());
    }

    let mut s = cleaned.as_str();
    let mut negative = false;

    if let Some(inner) = s.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        negative = true;
        s = inner;
    }
    if let Some(rest) = s.strip_suffix('-') {
        negative = !negative;
        s = rest;
    }
    if let Some(rest) = s.strip_prefix('-') {
        negative = !negative;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    let body = normalize_separators(s);
    if !number_re().is_match(&body) {
        return Err("not a number".to_string());
    }

    let value: Decimal = body.parse().map_err(|_| "out of range".to_string())?;
    if value >= Decimal::from(MAX_AMOUNT) {
        return Err("out of range".to_string());
    }
    Ok(if negative { -value } else { value })
}

fn normalize_separators(s: &str) -> String {
    let last_dot = s.rfind('.');
    let last_comma = s.rfind(',');

    match (last_dot, last_comma) {
        (Some(d), Some(c)) if d > c => s.replace(',', ""),
        (Some(_), Some(_)) => s.replace('.', "").replace(',', "."),
        (None, Some(c)) => {
            let tail = s.len() - c - 1;
            if s.matches(',').count() == 1 && (1..=2).contains(&tail) {
                s.replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
        (Some(_), None) if s.matches('.').count() > 1 => s.replace('.', ""),
        _ => s.to_string(),
    }
}

/// Money direction written in a debit/credit indicator column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    /// Apply to a magnitude: debits become negative, credits positive.
    pub fn apply(&self, amount: Decimal) -> Decimal {
        match self {
            Direction::Debit => -amount.abs(),
            Direction::Credit => amount.abs(),
        }
    }
}

/// Parse a D/K-style indicator. `Ok(None)` for an empty cell.
pub fn parse_indicator(raw: &str) -> Result<Option<Direction>, String> {
    let v = raw.trim().to_uppercase();
    match v.as_str() {
        "" => Ok(None),
        "D" | "DR" | "DEBIT" | "DEBETAS" => Ok(Some(Direction::Debit)),
        "K" | "C" | "CR" | "CREDIT" | "KREDITAS" => Ok(Some(Direction::Credit)),
        _ => Err("unknown debit/credit indicator".to_string()),
    }
}
