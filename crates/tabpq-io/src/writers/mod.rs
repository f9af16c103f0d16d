//! Column writer adapters.

pub mod memory;
pub mod parquet;
