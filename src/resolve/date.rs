//! Date normalization.
//!
//! Statement exports carry dates as native spreadsheet dates, spreadsheet
//! serial numbers, ISO strings, regional numeric strings with `/`, `-` or `.`
//! separators, or text-month forms like "Jan 03 2023". This module converts
//! any of those into a `NaiveDate`, or returns `None` so the field resolver
//! can apply the batch-level fallback. Parsing never errors.

use crate::model::CellValue;
use chrono::{Duration, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Which way to read an ambiguous numeric date like `03/04/2023`. Supplied
/// per ingestion call by the caller as a locale hint.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
#[clap(rename_all = "snake_case")]
pub enum DateOrder {
    /// DD/MM/YYYY, the order most non-US bank exports use.
    #[default]
    DayFirst,
    /// MM/DD/YYYY.
    MonthFirst,
}

serde_plain::derive_display_from_serialize!(DateOrder);
serde_plain::derive_fromstr_from_deserialize!(DateOrder);

/// A successfully normalized date. `ambiguous` is set when a numeric string
/// was valid under both orders and they disagree, so the caller can surface
/// the guess instead of presenting it as certain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    pub date: NaiveDate,
    pub ambiguous: bool,
}

impl ParsedDate {
    fn certain(date: NaiveDate) -> Self {
        Self {
            date,
            ambiguous: false,
        }
    }
}

/// Spreadsheet serial day 0 in the Excel 1900 date system. Using Dec 30
/// rather than Dec 31 absorbs the inherited Lotus leap-year bug.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Serials outside this window are treated as plain numbers, not dates.
const SERIAL_MIN: i64 = 1;
const SERIAL_MAX: i64 = 80_000; // ~year 2119

/// Month-name table: first three letters, matched case-insensitively.
const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Normalizes any recognized cell representation into a calendar date.
pub fn normalize(value: &CellValue, order: DateOrder) -> Option<ParsedDate> {
    match value {
        CellValue::Date(d) => Some(ParsedDate::certain(*d)),
        CellValue::Number(n) => from_serial(n.to_f64()?),
        CellValue::Text(s) => parse_str(s, order),
        CellValue::Empty => None,
    }
}

/// Converts a spreadsheet serial number (days since the 1900-system epoch,
/// fractional time ignored) into a date.
pub fn from_serial(serial: f64) -> Option<ParsedDate> {
    let days = serial.trunc() as i64;
    if !(SERIAL_MIN..=SERIAL_MAX).contains(&days) {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    epoch
        .checked_add_signed(Duration::days(days))
        .map(ParsedDate::certain)
}

/// Parses a date string, trying representations from most to least specific.
pub fn parse_str(s: &str, order: DateOrder) -> Option<ParsedDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(d) = parse_iso(s) {
        return Some(ParsedDate::certain(d));
    }
    if let Some(parsed) = parse_numeric(s, order) {
        return Some(parsed);
    }
    if let Some(d) = parse_text_month(s) {
        return Some(ParsedDate::certain(d));
    }
    // Numeric strings can be serials that arrived as text, e.g. from a CSV
    // re-export of a spreadsheet.
    if let Ok(n) = s.parse::<f64>() {
        return from_serial(n);
    }
    None
}

/// `YYYY-MM-DD`, optionally followed by a time component which is ignored.
fn parse_iso(s: &str) -> Option<NaiveDate> {
    let head = s.split(|c| c == 'T' || c == ' ').next()?;
    let parts: Vec<&str> = head.split('-').collect();
    if parts.len() != 3 || parts[0].len() != 4 {
        return None;
    }
    let y: i32 = parts[0].parse().ok()?;
    let m: u32 = parts[1].parse().ok()?;
    let d: u32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Numeric dates with `/`, `-` or `.` separators, read in the configured
/// order first and the other order second. A value that parses both ways and
/// disagrees is flagged ambiguous.
fn parse_numeric(s: &str, order: DateOrder) -> Option<ParsedDate> {
    let sep = ['/', '-', '.'].into_iter().find(|sep| s.contains(*sep))?;
    let parts: Vec<&str> = s.split(sep).map(str::trim).collect();
    if parts.len() != 3 || !parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    let a: u32 = parts[0].parse().ok()?;
    let b: u32 = parts[1].parse().ok()?;
    let year = expand_year(parts[2])?;

    let (first, second) = match order {
        DateOrder::DayFirst => ((b, a), (a, b)), // (month, day) tuples
        DateOrder::MonthFirst => ((a, b), (b, a)),
    };

    let preferred = NaiveDate::from_ymd_opt(year, first.0, first.1);
    let alternate = NaiveDate::from_ymd_opt(year, second.0, second.1);
    match (preferred, alternate) {
        (Some(p), Some(alt)) => Some(ParsedDate {
            date: p,
            ambiguous: p != alt,
        }),
        (Some(p), None) => Some(ParsedDate::certain(p)),
        (None, Some(alt)) => Some(ParsedDate::certain(alt)),
        (None, None) => None,
    }
}

/// Text-month formats in both "03 Jan 2023" and "Jan 03 2023" orders.
fn parse_text_month(s: &str) -> Option<NaiveDate> {
    let cleaned = s.replace(',', " ");
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    if parts.len() != 3 {
        return None;
    }

    // "DD Mon YYYY"
    if let (Ok(day), Some(month), Some(year)) = (
        parts[0].parse::<u32>(),
        month_number(parts[1]),
        expand_year(parts[2]),
    ) {
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(d);
        }
    }

    // "Mon DD YYYY"
    if let (Some(month), Ok(day), Some(year)) = (
        month_number(parts[0]),
        parts[1].parse::<u32>(),
        expand_year(parts[2]),
    ) {
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(d);
        }
    }

    None
}

fn month_number(token: &str) -> Option<u32> {
    if token.len() < 3 {
        return None;
    }
    let prefix = token[..3].to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|ix| ix as u32 + 1)
}

/// Two-digit years are expanded by prefixing "20".
fn expand_year(s: &str) -> Option<i32> {
    match s.len() {
        2 => format!("20{s}").parse().ok(),
        4 => s.parse().ok(),
        _ => None,
    }
}
