pub mod api;
pub mod args;
mod classify;
mod config;
mod error;
pub mod extract;
pub mod model;
mod pipeline;
pub mod resolve;
pub mod suggest;

pub use classify::{ClassifiedFile, TabularKind, DEFAULT_MAX_FILE_BYTES};
pub use config::Config;
pub use error::IngestError;
pub use error::Result;
pub use pipeline::Pipeline;
