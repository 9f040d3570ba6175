//! Types that represent the core data model, such as `RawRow` and
//! `NormalizedTransaction`.

pub mod candidates;
mod row;
mod transaction;

pub use row::{CellValue, RawRow};
pub use transaction::{
    Direction, IngestOutcome, NormalizedTransaction, RecordShape, Resolution, Suggestion,
    UNKNOWN_DESCRIPTION,
};
