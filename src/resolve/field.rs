//! Field resolution: mapping a [`RawRow`] to its canonical fields.
//!
//! Resolution is total. Per field, the candidate table is walked in rank
//! order (exact header match, then case-insensitive substring); the first
//! non-empty cell wins. When nothing matches, a compositional fallback runs,
//! and failing that the field-specific default applies. Missing data is never
//! an error here; every fallback that fires is recorded so the caller can see
//! how the row degraded.

use crate::model::candidates::{self, FieldCandidates};
use crate::model::{CellValue, RawRow, Resolution, UNKNOWN_DESCRIPTION};
use crate::resolve::amount::{
    self, DirectionEvidence, DirectionSignal, ParsedAmount, ResolvedDirection,
};
use crate::resolve::date::{self, DateOrder, ParsedDate};
use rust_decimal::Decimal;

/// All canonical fields of one row after resolution, plus the diagnostic
/// trail of fallbacks that fired. A `None` date means the batch-level
/// ingestion fallback applies (the resolver has no access to the captured
/// instant, so that substitution happens in the orchestrator).
#[derive(Debug, Clone)]
pub struct ResolvedRow {
    pub date: Option<ParsedDate>,
    pub description: String,
    pub amount: Decimal,
    pub direction: ResolvedDirection,
    pub resolutions: Vec<Resolution>,
}

/// Resolves every canonical field of `row`. Pure: the same row and order
/// always yield the same result.
pub fn resolve_row(row: &RawRow, order: DateOrder) -> ResolvedRow {
    let mut resolutions = Vec::new();

    let date = find_cell(row, &candidates::DATE)
        .and_then(|(_, cell)| date::normalize(cell, order));
    if let Some(parsed) = &date {
        if parsed.ambiguous {
            resolutions.push(Resolution::AmbiguousDateOrder);
        }
    }

    let description = resolve_description(row, &mut resolutions);
    let dedicated = resolve_dedicated(row);
    let (amount, amount_negative) = resolve_amount(row, &dedicated, &mut resolutions);

    let evidence = DirectionEvidence {
        type_field: find_cell(row, &candidates::TYPE).map(|(_, cell)| cell.as_text()),
        credit_column_populated: dedicated.credit.is_some(),
        debit_column_populated: dedicated.debit.is_some(),
        description: description.clone(),
        amount_negative,
    };
    let direction = amount::resolve_direction(&evidence);
    match direction.signal {
        DirectionSignal::Defaulted => resolutions.push(Resolution::DirectionDefaulted),
        DirectionSignal::Keywords => resolutions.push(Resolution::DirectionFromKeywords),
        DirectionSignal::Sign => resolutions.push(Resolution::DirectionFromSign),
        DirectionSignal::TypeField | DirectionSignal::DedicatedColumn => {}
    }

    ResolvedRow {
        date,
        description,
        amount,
        direction,
        resolutions,
    }
}

/// Finds the first non-empty cell matching a candidate table, in rank order.
fn find_cell<'a>(row: &'a RawRow, candidates: &FieldCandidates) -> Option<(&'a str, &'a CellValue)> {
    for pattern in candidates.patterns {
        for (label, cell) in row.iter() {
            if pattern.matches(label) && !cell.is_empty() {
                return Some((label, cell));
            }
        }
    }
    None
}

fn resolve_description(row: &RawRow, resolutions: &mut Vec<Resolution>) -> String {
    if let Some((_, cell)) = find_cell(row, &candidates::DESCRIPTION) {
        let text = cell.as_text().trim().to_string();
        if !text.is_empty() {
            return text;
        }
    }

    // Compositional fallback: stitch secondary columns together so the row
    // still carries something a reviewer can recognize.
    let composed: Vec<String> = candidates::DESCRIPTION_COMPOSE
        .patterns
        .iter()
        .filter_map(|pattern| {
            row.iter()
                .find(|(label, cell)| pattern.matches(label) && !cell.is_empty())
                .map(|(_, cell)| cell.as_text().trim().to_string())
        })
        .filter(|s| !s.is_empty())
        .collect();
    if !composed.is_empty() {
        resolutions.push(Resolution::DescriptionComposed);
        return composed.join(" - ");
    }

    resolutions.push(Resolution::DescriptionDefaulted);
    UNKNOWN_DESCRIPTION.to_string()
}

/// The parsed values of the dedicated credit/debit column pair. A cell that
/// is unparseable or holds zero counts as unpopulated: many exports write
/// `0.00` in the unused column of the pair.
#[derive(Debug, Clone, Copy, Default)]
struct DedicatedAmounts {
    credit: Option<ParsedAmount>,
    debit: Option<ParsedAmount>,
}

fn resolve_dedicated(row: &RawRow) -> DedicatedAmounts {
    let parse = |field: &FieldCandidates| {
        find_cell(row, field)
            .and_then(|(_, cell)| amount::parse_amount(cell))
            .filter(|parsed| !parsed.magnitude.is_zero())
    };
    DedicatedAmounts {
        credit: parse(&candidates::CREDIT),
        debit: parse(&candidates::DEBIT),
    }
}

/// Resolves the magnitude. Dedicated credit/debit columns take precedence
/// over a generic amount column so an export carrying both is not
/// double-counted. The sign is only reported for a generic signed column;
/// dedicated columns carry their direction in the column itself.
fn resolve_amount(
    row: &RawRow,
    dedicated: &DedicatedAmounts,
    resolutions: &mut Vec<Resolution>,
) -> (Decimal, Option<bool>) {
    if let Some(parsed) = dedicated.credit.or(dedicated.debit) {
        return (parsed.magnitude, None);
    }

    if let Some(parsed) = find_cell(row, &candidates::AMOUNT)
        .and_then(|(_, cell)| amount::parse_amount(cell))
    {
        return (parsed.magnitude, Some(parsed.negative));
    }

    // Last resort: scan every column whose header mentions an amount-like
    // token and take the first parseable value.
    if let Some(parsed) = scan_amount_columns(row) {
        resolutions.push(Resolution::AmountScanned);
        return (parsed.magnitude, Some(parsed.negative));
    }

    resolutions.push(Resolution::AmountDefaulted);
    (Decimal::ZERO, None)
}

fn scan_amount_columns(row: &RawRow) -> Option<ParsedAmount> {
    row.iter()
        .filter(|(label, _)| {
            let lower = label.to_lowercase();
            lower.contains("amount") || lower.contains("credit") || lower.contains("debit")
        })
        .find_map(|(_, cell)| amount::parse_amount(cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Direction;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn row(cells: &[(&str, &str)]) -> RawRow {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), CellValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_canonical_credit_row() {
        let r = row(&[
            ("Date", "15/11/2023"),
            ("Description", "SALARY PAYMENT"),
            ("Credit", "50,000.00"),
        ]);
        let resolved = resolve_row(&r, DateOrder::DayFirst);
        assert_eq!(
            resolved.date.unwrap().date,
            NaiveDate::from_ymd_opt(2023, 11, 15).unwrap()
        );
        assert_eq!(resolved.description, "SALARY PAYMENT");
        assert_eq!(resolved.amount, dec!(50000.00));
        assert_eq!(resolved.direction.direction, Direction::Credit);
        assert_eq!(resolved.direction.signal, DirectionSignal::DedicatedColumn);
    }

    #[test]
    fn test_narration_and_paren_negative() {
        // Unusual headers, a text month, and a parenthesis negative.
        let r = row(&[
            ("TRANSACTION DATE", "Jan 03 2023"),
            ("NARRATION", "ATM WITHDRAWAL"),
            ("Amount", "(2,500.00)"),
        ]);
        let resolved = resolve_row(&r, DateOrder::DayFirst);
        assert_eq!(
            resolved.date.unwrap().date,
            NaiveDate::from_ymd_opt(2023, 1, 3).unwrap()
        );
        assert_eq!(resolved.description, "ATM WITHDRAWAL");
        assert_eq!(resolved.amount, dec!(2500.00));
        assert_eq!(resolved.direction.direction, Direction::Debit);
        // Keywords beat the sign in the ladder, and "WITHDRAWAL" is a keyword.
        assert_eq!(resolved.direction.signal, DirectionSignal::Keywords);
    }

    #[test]
    fn test_no_recognizable_columns_still_resolves() {
        // Nothing matches except a description-like column.
        let r = row(&[("Narrative", "POS PURCHASE 1234"), ("Balance", "991.22")]);
        let resolved = resolve_row(&r, DateOrder::DayFirst);
        assert!(resolved.date.is_none());
        assert_eq!(resolved.description, "POS PURCHASE 1234");
        assert_eq!(resolved.amount, Decimal::ZERO);
        assert!(resolved.resolutions.contains(&Resolution::AmountDefaulted));
    }

    #[test]
    fn test_sentinel_description() {
        let r = row(&[("Date", "2023-01-01"), ("Amount", "10.00")]);
        let resolved = resolve_row(&r, DateOrder::DayFirst);
        assert_eq!(resolved.description, UNKNOWN_DESCRIPTION);
        assert!(resolved
            .resolutions
            .contains(&Resolution::DescriptionDefaulted));
    }

    #[test]
    fn test_composed_description() {
        let r = row(&[
            ("Date", "2023-01-01"),
            ("Counterparty", "ACME LTD"),
            ("Reference", "INV-0042"),
        ]);
        let resolved = resolve_row(&r, DateOrder::DayFirst);
        assert_eq!(resolved.description, "ACME LTD - INV-0042");
        assert!(resolved
            .resolutions
            .contains(&Resolution::DescriptionComposed));
    }

    #[test]
    fn test_dedicated_columns_beat_generic_amount() {
        // Both a Debit column and an Amount column present; the dedicated
        // column must win and the generic sign must not flip direction.
        let r = row(&[
            ("Date", "2023-01-01"),
            ("Description", "STORE"),
            ("Debit", "100.00"),
            ("Amount", "-100.00"),
        ]);
        let resolved = resolve_row(&r, DateOrder::DayFirst);
        assert_eq!(resolved.amount, dec!(100.00));
        assert_eq!(resolved.direction.direction, Direction::Debit);
        assert_eq!(resolved.direction.signal, DirectionSignal::DedicatedColumn);
    }

    #[test]
    fn test_zero_filled_credit_cell_does_not_shadow_debit() {
        // Exports that always emit the pair write 0.00 in the unused column;
        // the zero cell must not win over the real value.
        let r = row(&[
            ("Date", "01/02/2023"),
            ("Description", "POS PURCHASE"),
            ("Credit", "0.00"),
            ("Debit", "2,500.00"),
        ]);
        let resolved = resolve_row(&r, DateOrder::DayFirst);
        assert_eq!(resolved.amount, dec!(2500.00));
        assert_eq!(resolved.direction.direction, Direction::Debit);
        assert_eq!(resolved.direction.signal, DirectionSignal::DedicatedColumn);
    }

    #[test]
    fn test_zero_filled_debit_cell_does_not_shadow_credit() {
        let r = row(&[
            ("Date", "01/02/2023"),
            ("Description", "TRANSFER IN"),
            ("Credit", "75.50"),
            ("Debit", "0.00"),
        ]);
        let resolved = resolve_row(&r, DateOrder::DayFirst);
        assert_eq!(resolved.amount, dec!(75.50));
        assert_eq!(resolved.direction.direction, Direction::Credit);
        assert_eq!(resolved.direction.signal, DirectionSignal::DedicatedColumn);
    }

    #[test]
    fn test_debit_credit_pair_only_one_populated() {
        let r = row(&[
            ("Date", "2023-01-01"),
            ("Description", "TRANSFER IN"),
            ("Debit", ""),
            ("Credit", "75.50"),
        ]);
        let resolved = resolve_row(&r, DateOrder::DayFirst);
        assert_eq!(resolved.amount, dec!(75.50));
        assert_eq!(resolved.direction.direction, Direction::Credit);
    }

    #[test]
    fn test_amount_scan_fallback() {
        let r = row(&[
            ("Date", "2023-01-01"),
            ("Description", "SOMETHING"),
            ("Txn Amount (NGN)", "1,200.00"),
        ]);
        let resolved = resolve_row(&r, DateOrder::DayFirst);
        assert_eq!(resolved.amount, dec!(1200.00));
    }

    #[test]
    fn test_explicit_type_field() {
        let r = row(&[
            ("Date", "2023-01-01"),
            ("Description", "MISC"),
            ("Amount", "10.00"),
            ("Transaction Type", "credit"),
        ]);
        let resolved = resolve_row(&r, DateOrder::DayFirst);
        assert_eq!(resolved.direction.direction, Direction::Credit);
        assert_eq!(resolved.direction.signal, DirectionSignal::TypeField);
    }

    #[test]
    fn test_idempotent() {
        let r = row(&[
            ("Date", "03/04/2023"),
            ("Description", "AMBIGUOUS DAY"),
            ("Amount", "(9.99)"),
        ]);
        let a = resolve_row(&r, DateOrder::DayFirst);
        let b = resolve_row(&r, DateOrder::DayFirst);
        assert_eq!(a.date, b.date);
        assert_eq!(a.description, b.description);
        assert_eq!(a.amount, b.amount);
        assert_eq!(a.direction, b.direction);
        assert_eq!(a.resolutions, b.resolutions);
    }
}
