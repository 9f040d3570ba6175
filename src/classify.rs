//! File classification and validation.
//!
//! Decides how a user-supplied statement file should be extracted: the
//! tabular path (delimited text, spreadsheet) or the unstructured path (PDF
//! or scan). Extension is consulted first, content magic second. A pure
//! decision function with no side effects.

use crate::error::{IngestError, Result};

/// Default byte ceiling for uploaded statements.
pub const DEFAULT_MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// The flavor of grid a tabular file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularKind {
    /// CSV or other delimited text.
    Delimited,
    /// An xlsx/xls workbook.
    Spreadsheet,
}

/// The classified file, routed to one of the two extraction paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassifiedFile {
    Tabular(TabularKind, Vec<u8>),
    Unstructured(Vec<u8>),
}

const PDF_MAGIC: &[u8] = b"%PDF";
const ZIP_MAGIC: &[u8] = b"PK\x03\x04"; // xlsx is a zip container
const OLE_MAGIC: &[u8] = &[0xd0, 0xcf, 0x11, 0xe0]; // legacy xls

/// Classifies `bytes` using the declared `name`, enforcing the size ceiling.
/// Anything outside {delimited text, spreadsheet, PDF} is rejected.
pub fn classify(name: &str, bytes: Vec<u8>, max_bytes: usize) -> Result<ClassifiedFile> {
    if bytes.len() > max_bytes {
        return Err(IngestError::FileTooLarge {
            size: bytes.len(),
            limit: max_bytes,
        });
    }

    let extension = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "csv" | "tsv" | "txt" => Ok(ClassifiedFile::Tabular(TabularKind::Delimited, bytes)),
        "xlsx" | "xls" => Ok(ClassifiedFile::Tabular(TabularKind::Spreadsheet, bytes)),
        "pdf" => Ok(ClassifiedFile::Unstructured(bytes)),
        _ => classify_by_content(name, bytes),
    }
}

/// Falls back to content magic when the extension is missing or unrecognized.
fn classify_by_content(name: &str, bytes: Vec<u8>) -> Result<ClassifiedFile> {
    if bytes.starts_with(PDF_MAGIC) {
        return Ok(ClassifiedFile::Unstructured(bytes));
    }
    if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
        return Ok(ClassifiedFile::Tabular(TabularKind::Spreadsheet, bytes));
    }
    if looks_like_delimited_text(&bytes) {
        return Ok(ClassifiedFile::Tabular(TabularKind::Delimited, bytes));
    }
    Err(IngestError::UnsupportedFormat(name.to_string()))
}

/// A cheap sniff: valid UTF-8, and the first line carries a field separator.
fn looks_like_delimited_text(bytes: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(bytes) else {
        return false;
    };
    match text.lines().next() {
        Some(first) => first.contains(',') || first.contains('\t') || first.contains(';'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_wins() {
        let classified = classify("export.csv", b"Date,Amount\n".to_vec(), 1024).unwrap();
        assert!(matches!(
            classified,
            ClassifiedFile::Tabular(TabularKind::Delimited, _)
        ));

        let classified = classify("statement.PDF", b"%PDF-1.7 ...".to_vec(), 1024).unwrap();
        assert!(matches!(classified, ClassifiedFile::Unstructured(_)));

        let classified = classify("book.xlsx", b"PK\x03\x04rest".to_vec(), 1024).unwrap();
        assert!(matches!(
            classified,
            ClassifiedFile::Tabular(TabularKind::Spreadsheet, _)
        ));
    }

    #[test]
    fn test_content_sniff_without_extension() {
        let classified = classify("statement", b"%PDF-1.4".to_vec(), 1024).unwrap();
        assert!(matches!(classified, ClassifiedFile::Unstructured(_)));

        let classified = classify("export", b"Date,Description,Amount\n1,2,3\n".to_vec(), 1024)
            .unwrap();
        assert!(matches!(
            classified,
            ClassifiedFile::Tabular(TabularKind::Delimited, _)
        ));
    }

    #[test]
    fn test_unsupported_format() {
        let err = classify("photo.png", vec![0x89, 0x50, 0x4e, 0x47], 1024).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_size_ceiling() {
        let err = classify("big.csv", vec![0u8; 2048], 1024).unwrap_err();
        match err {
            IngestError::FileTooLarge { size, limit } => {
                assert_eq!(size, 2048);
                assert_eq!(limit, 1024);
            }
            other => panic!("expected FileTooLarge, got {other:?}"),
        }
    }
}
