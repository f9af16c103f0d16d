//! Run manifest emitted after a successful conversion.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::Compression;
use crate::hash::{hash_schema, Hash256};
use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionManifest {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub compression: Compression,
    pub schema: Schema,

    /// Stable hash of column names + encodings; equal across repeat runs.
    pub schema_hash: Hash256,

    /// Rows replayed from the sample buffer.
    pub sampled_rows: u64,
    /// Rows streamed after the sample.
    pub tail_rows: u64,

    /// Converter version string for provenance.
    pub version: String,

    /// Milliseconds since Unix epoch (UTC).
    pub started_ms: u64,
    pub finished_ms: u64,
}

impl ConversionManifest {
    pub fn new(
        input_path: PathBuf,
        output_path: PathBuf,
        compression: Compression,
        schema: Schema,
        started_ms: u64,
    ) -> Self {
        let schema_hash = hash_schema(&schema);
        Self {
            input_path,
            output_path,
            compression,
            schema,
            schema_hash,
            sampled_rows: 0,
            tail_rows: 0,
            version: crate::VERSION.to_string(),
            started_ms,
            finished_ms: started_ms,
        }
    }

    pub fn finish(mut self, sampled_rows: u64, tail_rows: u64, finished_ms: u64) -> Self {
        self.sampled_rows = sampled_rows;
        self.tail_rows = tail_rows;
        self.finished_ms = finished_ms;
        self
    }

    pub fn rows_written(&self) -> u64 {
        self.sampled_rows + self.tail_rows
    }

    pub fn duration_ms(&self) -> u64 {
        self.finished_ms.saturating_sub(self.started_ms)
    }
}
