#![forbid(unsafe_code)]
//! tabpq-io: the concrete edges of the converter.
//!
//! - `readers::tsv`: tab-delimited row source over the `csv` crate.
//! - `writers::parquet`: Arrow/Parquet column writer adapter.
//! - `writers::memory`: in-memory adapter for tests (records rows, can inject write failures).

pub mod readers;
pub mod writers;

pub use readers::tsv::TsvRowSource;
pub use writers::memory::{MemoryAdapter, MemoryTable};
pub use writers::parquet::ParquetAdapter;
