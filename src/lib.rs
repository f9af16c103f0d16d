//! tabpq: TSV → Parquet conversion with per-column encoding chosen from a
//! prefix sample. Facade over the workspace crates.

pub use tabpq_core as core;
pub use tabpq_exec as exec;
pub use tabpq_io as io;
