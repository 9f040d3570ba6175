//! The pre-interpretation view of one statement line.
//!
//! A [`RawRow`] is an ordered association list from the original column label
//! (verbatim, case and punctuation preserved) to a [`CellValue`]. Resolution
//! later depends on exact substring matches against those labels, so nothing
//! here is lower-cased or trimmed beyond what the extractor saw.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single cell as produced by an extractor. Spreadsheets can hand us typed
/// numbers and dates; delimited text is always `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellValue {
    Text(String),
    Number(Decimal),
    Date(NaiveDate),
    Empty,
}

impl CellValue {
    /// The cell rendered as a plain string, the way it would appear in a CSV.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Empty => true,
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::from(value.as_str())
    }
}

/// One statement line before interpretation: an ordered mapping from the
/// column label as it appeared in the source file to the cell value.
/// Immutable once produced by an extractor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, CellValue)>,
}

impl RawRow {
    pub fn new(cells: Vec<(String, CellValue)>) -> Self {
        Self { cells }
    }

    /// Builds a row by zipping headers with values. Rows shorter than the
    /// header list are padded with empty cells; extra cells get positional
    /// labels so no data is silently discarded.
    pub fn from_headers<S1, S2>(headers: &[S1], values: &[S2]) -> Self
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let mut cells: Vec<(String, CellValue)> = headers
            .iter()
            .enumerate()
            .map(|(ix, header)| {
                let value = values.get(ix).map(|v| v.as_ref()).unwrap_or_default();
                (header.as_ref().to_string(), CellValue::from(value))
            })
            .collect();
        for (ix, value) in values.iter().enumerate().skip(headers.len()) {
            cells.push((format!("Column {}", ix + 1), CellValue::from(value.as_ref())));
        }
        Self { cells }
    }

    /// Iterates cells in their original column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The value under an exact label match, if any.
    pub fn get(&self, label: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| k == label).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell in the row is blank. The orchestrator drops such
    /// rows; it is the only condition under which a row is dropped.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_empty())
    }
}

impl<S: Into<String>> FromIterator<(S, CellValue)> for RawRow {
    fn from_iter<T: IntoIterator<Item = (S, CellValue)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_headers_pads_short_rows() {
        let row = RawRow::from_headers(&["Date", "Description", "Amount"], &["2024-01-01", "X"]);
        assert_eq!(row.len(), 3);
        assert_eq!(row.get("Amount"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_from_headers_labels_extra_cells() {
        let row = RawRow::from_headers(&["Date"], &["2024-01-01", "overflow"]);
        assert_eq!(row.len(), 2);
        assert_eq!(
            row.get("Column 2"),
            Some(&CellValue::Text("overflow".to_string()))
        );
    }

    #[test]
    fn test_labels_preserved_verbatim() {
        let row = RawRow::from_headers(&["TRANSACTION  DATE ", "Näme"], &["a", "b"]);
        assert!(row.get("TRANSACTION  DATE ").is_some());
        assert!(row.get("transaction  date ").is_none());
    }

    #[test]
    fn test_blank_detection() {
        let row = RawRow::from_headers(&["A", "B"], &["  ", ""]);
        assert!(row.is_blank());
        let row = RawRow::from_headers(&["A", "B"], &["  ", "x"]);
        assert!(!row.is_blank());
    }
}
