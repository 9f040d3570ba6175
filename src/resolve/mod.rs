//! Resolution of raw statement rows into canonical fields.
//!
//! There is exactly one normalization code path: tabular rows and records
//! returned by the extraction services all pass through [`field::resolve_row`]
//! regardless of origin.

pub mod amount;
pub mod date;
pub mod field;

pub use date::DateOrder;
pub use field::{resolve_row, ResolvedRow};
