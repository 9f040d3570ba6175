//! Tabular extraction: delimited text and spreadsheet grids.
//!
//! Produces headers plus [`RawRow`]s with no semantic interpretation. Header
//! text is preserved verbatim (case, spacing, symbols) because downstream
//! resolution depends on exact substring matches. The only analysis done here
//! is per-column type sniffing, which later serves as a hint to the date
//! normalizer, never as a hard gate.

use crate::classify::TabularKind;
use crate::error::Result;
use crate::model::{CellValue, RawRow};
use anyhow::Context;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::io::Cursor;
use std::str::FromStr;
use tracing::debug;

/// How many rows the column sniffer samples.
const SNIFF_SAMPLE_ROWS: usize = 20;

/// The majority-vote type of a column, from sampling its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnHint {
    Date,
    Numeric,
    Text,
}

/// The extracted grid: headers in original order, one RawRow per data line,
/// and a sniffed type hint per column.
#[derive(Debug, Clone)]
pub struct TableGrid {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    pub hints: Vec<ColumnHint>,
}

impl TableGrid {
    /// The label of the leftmost column sniffed as dates, if any. Used by
    /// the orchestrator as a date-resolution hint when no header matched.
    pub fn date_hint_column(&self) -> Option<&str> {
        self.hints
            .iter()
            .position(|h| *h == ColumnHint::Date)
            .and_then(|ix| self.headers.get(ix))
            .map(String::as_str)
    }
}

/// Extracts a grid from tabular bytes. Row 0 becomes the header row; every
/// later row becomes a RawRow. Trailing blank rows are dropped.
pub fn extract(kind: TabularKind, bytes: &[u8]) -> Result<TableGrid> {
    let grid = match kind {
        TabularKind::Delimited => extract_delimited(bytes)?,
        TabularKind::Spreadsheet => extract_spreadsheet(bytes)?,
    };
    debug!(
        headers = grid.headers.len(),
        rows = grid.rows.len(),
        "extracted tabular grid"
    );
    Ok(grid)
}

fn extract_delimited(bytes: &[u8]) -> Result<TableGrid> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(bytes);

    let mut lines: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.context("failed to read a delimited record")?;
        lines.push(record.iter().map(|s| s.to_string()).collect());
    }
    build_grid(lines)
}

fn extract_spreadsheet(bytes: &[u8]) -> Result<TableGrid> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).context("failed to open the workbook")?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("the workbook has no sheets")?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("failed to read sheet '{sheet_name}'"))?;

    let mut lines = range.rows();
    let headers: Vec<String> = match lines.next() {
        Some(header_row) => header_row.iter().map(|c| c.to_string()).collect(),
        None => Vec::new(),
    };

    let mut rows: Vec<RawRow> = Vec::new();
    for cells in lines {
        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(ix, header)| {
                let value = cells.get(ix).map(cell_value).unwrap_or(CellValue::Empty);
                (header.clone(), value)
            })
            .collect();
        rows.push(row);
    }
    while rows.last().is_some_and(RawRow::is_blank) {
        rows.pop();
    }

    let hints = sniff_columns(&rows, headers.len());
    Ok(TableGrid {
        headers,
        rows,
        hints,
    })
}

/// Converts a typed spreadsheet cell. Dates and numbers keep their types so
/// the date normalizer can use them directly.
fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from(s.as_str()),
        Data::Int(i) => Decimal::from_i64(*i).map_or(CellValue::Empty, CellValue::Number),
        Data::Float(f) => Decimal::from_f64(*f).map_or(CellValue::Empty, CellValue::Number),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => match crate::resolve::date::from_serial(dt.as_f64()) {
            Some(parsed) => CellValue::Date(parsed.date),
            None => CellValue::Empty,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from(s.as_str()),
        Data::Error(_) => CellValue::Empty,
    }
}

fn build_grid(mut lines: Vec<Vec<String>>) -> Result<TableGrid> {
    // Drop trailing all-blank lines before splitting off the header.
    while lines
        .last()
        .is_some_and(|line| line.iter().all(|cell| cell.trim().is_empty()))
    {
        lines.pop();
    }

    let mut lines = lines.into_iter();
    let headers: Vec<String> = lines.next().unwrap_or_default();
    let rows: Vec<RawRow> = lines
        .map(|values| RawRow::from_headers(&headers, &values))
        .collect();
    let hints = sniff_columns(&rows, headers.len());
    Ok(TableGrid {
        headers,
        rows,
        hints,
    })
}

/// Majority-votes the type of each column from up to [`SNIFF_SAMPLE_ROWS`]
/// sampled rows. Blank cells do not vote.
fn sniff_columns(rows: &[RawRow], columns: usize) -> Vec<ColumnHint> {
    (0..columns)
        .map(|col| {
            let mut dates = 0usize;
            let mut numbers = 0usize;
            let mut texts = 0usize;
            for row in rows.iter().take(SNIFF_SAMPLE_ROWS) {
                let Some((_, cell)) = row.iter().nth(col) else {
                    continue;
                };
                match sniff_cell(cell) {
                    Some(ColumnHint::Date) => dates += 1,
                    Some(ColumnHint::Numeric) => numbers += 1,
                    Some(ColumnHint::Text) => texts += 1,
                    None => {}
                }
            }
            if dates >= numbers && dates >= texts && dates > 0 {
                ColumnHint::Date
            } else if numbers >= texts && numbers > 0 {
                ColumnHint::Numeric
            } else {
                ColumnHint::Text
            }
        })
        .collect()
}

fn sniff_cell(cell: &CellValue) -> Option<ColumnHint> {
    match cell {
        CellValue::Empty => None,
        CellValue::Date(_) => Some(ColumnHint::Date),
        CellValue::Number(_) => Some(ColumnHint::Numeric),
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else if looks_like_date(trimmed) {
                Some(ColumnHint::Date)
            } else if Decimal::from_str(&trimmed.replace(['$', ','], "")).is_ok() {
                Some(ColumnHint::Numeric)
            } else {
                Some(ColumnHint::Text)
            }
        }
    }
}

/// A lighter check than full date parsing: digits with date separators in a
/// date-like arrangement.
fn looks_like_date(s: &str) -> bool {
    let seps = s.chars().filter(|c| ['/', '-', '.'].contains(c)).count();
    seps == 2 && s.chars().all(|c| c.is_ascii_digit() || ['/', '-', '.'].contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn csv_grid(data: &str) -> TableGrid {
        extract(TabularKind::Delimited, data.as_bytes()).unwrap()
    }

    #[test]
    fn test_headers_verbatim() {
        let grid = csv_grid("TRANSACTION DATE,NARRATION ,Amt (NGN)\n01/02/2023,POS,100\n");
        assert_eq!(
            grid.headers,
            vec!["TRANSACTION DATE", "NARRATION ", "Amt (NGN)"]
        );
        assert!(grid.rows[0].get("NARRATION ").is_some());
    }

    #[test]
    fn test_trailing_blank_rows_dropped() {
        let grid = csv_grid("Date,Amount\n01/02/2023,100\n,\n,\n");
        assert_eq!(grid.rows.len(), 1);
    }

    #[test]
    fn test_interior_blank_rows_kept() {
        // Interior blanks are the orchestrator's call to drop, not ours.
        let grid = csv_grid("Date,Amount\n01/02/2023,100\n,\n02/02/2023,50\n");
        assert_eq!(grid.rows.len(), 3);
        assert!(grid.rows[1].is_blank());
    }

    #[test]
    fn test_ragged_rows_tolerated() {
        let grid = csv_grid("Date,Description,Amount\n01/02/2023,Short\n");
        assert_eq!(grid.rows[0].len(), 3);
    }

    #[test]
    fn test_column_sniffing() {
        let grid = csv_grid(
            "Date,Description,Amount\n\
             01/02/2023,POS PURCHASE,100.00\n\
             02/02/2023,TRANSFER,250.50\n\
             03/02/2023,ATM,75.00\n",
        );
        assert_eq!(
            grid.hints,
            vec![ColumnHint::Date, ColumnHint::Text, ColumnHint::Numeric]
        );
        assert_eq!(grid.date_hint_column(), Some("Date"));
    }

    #[test]
    fn test_empty_input() {
        let grid = csv_grid("");
        assert!(grid.headers.is_empty());
        assert!(grid.rows.is_empty());
    }

    #[test]
    fn test_mixed_column_majority_vote() {
        let grid = csv_grid(
            "Ref,Val\n\
             note,1\n\
             10,2\n\
             20,3\n",
        );
        // Two numeric votes beat one text vote.
        assert_eq!(grid.hints[0], ColumnHint::Numeric);
    }
}
