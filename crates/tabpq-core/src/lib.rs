#![forbid(unsafe_code)]
//! tabpq-core: shared types for the TSV → Parquet converter.
//!
//! Pure data and traits only. Concrete readers/writers live in `tabpq-io`,
//! sampling and the pipeline driver in `tabpq-exec`.

pub mod config;
pub mod error;
pub mod hash;
pub mod manifest;
pub mod prelude;
pub mod row;
pub mod schema;
pub mod sink;
pub mod source;

/// Crate version recorded in run manifests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
