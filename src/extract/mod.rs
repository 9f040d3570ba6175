//! Extraction of candidate rows from classified files.

pub mod tabular;
pub mod unstructured;

pub use tabular::{TableGrid, extract as extract_tabular};
pub use unstructured::{extract as extract_unstructured, ExtractionOrigin, UnstructuredExtraction};
