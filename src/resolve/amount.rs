//! Amount and direction resolution.
//!
//! Amounts arrive with currency symbols, thousands separators, parenthesis
//! negatives, or explicit DR/CR markers. The magnitude and the direction are
//! resolved separately so a sign is never interpreted twice: `parse_amount`
//! returns the absolute magnitude plus the sign it saw, and the direction
//! ladder in [`resolve_direction`] decides what that sign means, if anything.

use crate::model::{CellValue, Direction};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Currency markers stripped before numeric parsing. Symbols only; ISO codes
/// like "NGN" or "USD" are handled by the alphabetic filter below.
const CURRENCY_SYMBOLS: [char; 6] = ['$', '€', '£', '₦', '¥', '₹'];

/// A parsed magnitude along with the sign evidence that came with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedAmount {
    /// Non-negative magnitude.
    pub magnitude: Decimal,
    /// True when the raw value was negative, via a leading minus or an
    /// accounting-style parenthesis wrap.
    pub negative: bool,
}

/// Parses a cell into a non-negative magnitude, tolerating currency symbols,
/// thousands separators, whitespace, trailing DR/CR markers and
/// parenthesis-negatives. Returns `None` when no number can be found.
pub fn parse_amount(value: &CellValue) -> Option<ParsedAmount> {
    match value {
        CellValue::Number(n) => Some(ParsedAmount {
            magnitude: n.abs(),
            negative: n.is_sign_negative(),
        }),
        CellValue::Text(s) => parse_amount_str(s),
        CellValue::Date(_) | CellValue::Empty => None,
    }
}

/// String form of [`parse_amount`].
pub fn parse_amount_str(s: &str) -> Option<ParsedAmount> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    let wrapped_in_parens = trimmed.starts_with('(') && trimmed.ends_with(')');
    let inner = if wrapped_in_parens {
        &trimmed[1..trimmed.len() - 1]
    } else {
        trimmed
    };

    let cleaned: String = inner
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c))
        .filter(|c| !c.is_whitespace() && *c != ',')
        .filter(|c| !c.is_alphabetic())
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(&cleaned).ok()?;
    Some(ParsedAmount {
        magnitude: value.abs(),
        negative: wrapped_in_parens || value.is_sign_negative(),
    })
}

/// Description keywords that signal money in.
const CREDIT_KEYWORDS: [&str; 4] = ["credit", "deposit", "inward", "refund"];

/// Description keywords that signal money out.
const DEBIT_KEYWORDS: [&str; 5] = ["debit", "withdrawal", "payment", "purchase", "outward"];

/// How the direction was decided, from strongest to weakest signal. The
/// orchestrator maps the weak variants into row diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionSignal {
    /// An upstream type field said so explicitly.
    TypeField,
    /// A dedicated credit or debit column was populated.
    DedicatedColumn,
    /// Keywords in the description text.
    Keywords,
    /// The sign of a signed amount value.
    Sign,
    /// Nothing matched; the policy default (debit) was applied.
    Defaulted,
}

/// A resolved direction plus the signal that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedDirection {
    pub direction: Direction,
    pub signal: DirectionSignal,
}

/// Inputs to the direction ladder, gathered by the field resolver.
#[derive(Debug, Default, Clone)]
pub struct DirectionEvidence {
    /// An explicit type field value, e.g. "credit", "DR", "deposit".
    pub type_field: Option<String>,
    /// True when a column whose header contains "credit" held a value.
    pub credit_column_populated: bool,
    /// True when a column whose header contains "debit" held a value.
    pub debit_column_populated: bool,
    /// The resolved description text.
    pub description: String,
    /// Sign evidence from the amount, if a signed value was available.
    pub amount_negative: Option<bool>,
}

/// Resolves the direction by walking the evidence ladder: explicit type
/// field, then dedicated columns, then description keywords, then the amount
/// sign, then the documented debit default. Total; never fails.
pub fn resolve_direction(evidence: &DirectionEvidence) -> ResolvedDirection {
    if let Some(type_field) = &evidence.type_field {
        if let Some(direction) = direction_from_token(type_field) {
            return ResolvedDirection {
                direction,
                signal: DirectionSignal::TypeField,
            };
        }
    }

    if evidence.credit_column_populated != evidence.debit_column_populated {
        let direction = if evidence.credit_column_populated {
            Direction::Credit
        } else {
            Direction::Debit
        };
        return ResolvedDirection {
            direction,
            signal: DirectionSignal::DedicatedColumn,
        };
    }

    if let Some(direction) = direction_from_keywords(&evidence.description) {
        return ResolvedDirection {
            direction,
            signal: DirectionSignal::Keywords,
        };
    }

    if let Some(negative) = evidence.amount_negative {
        let direction = if negative {
            Direction::Debit
        } else {
            Direction::Credit
        };
        return ResolvedDirection {
            direction,
            signal: DirectionSignal::Sign,
        };
    }

    // Documented policy bias: an unknowable direction is treated as money
    // out, tagged so the caller can tell it apart from a confident answer.
    ResolvedDirection {
        direction: Direction::Debit,
        signal: DirectionSignal::Defaulted,
    }
}

/// Maps an explicit type token ("credit", "CR", "withdrawal", ...) to a
/// direction. `Unknown` is honored when the upstream field says so.
fn direction_from_token(token: &str) -> Option<Direction> {
    let t = token.trim().to_lowercase();
    match t.as_str() {
        "credit" | "cr" | "deposit" | "inward" | "in" => Some(Direction::Credit),
        "debit" | "dr" | "withdrawal" | "payment" | "purchase" | "outward" | "out" => {
            Some(Direction::Debit)
        }
        "unknown" => Some(Direction::Unknown),
        _ => None,
    }
}

fn direction_from_keywords(description: &str) -> Option<Direction> {
    let lower = description.to_lowercase();
    if CREDIT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(Direction::Credit);
    }
    if DEBIT_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return Some(Direction::Debit);
    }
    // Bare DR/CR markers must stand alone as words; a substring check would
    // trip on merchant names like "CREST" or "DRUGSTORE".
    for token in lower.split(|c: char| !c.is_alphanumeric()) {
        match token {
            "cr" => return Some(Direction::Credit),
            "dr" => return Some(Direction::Debit),
            _ => {}
        }
    }
    None
}
