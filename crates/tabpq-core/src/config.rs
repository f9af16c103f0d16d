//! Converter configuration that downstream crates can serialize/deserialize.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Rows read into the sample buffer before the encoding policy is decided.
pub const DEFAULT_SAMPLE_ROWS: usize = 8192;

/// Columns with at most this many distinct sampled values are dictionary-eligible.
pub const DEFAULT_DICTIONARY_THRESHOLD: usize = 16;

/// Rows between two progress notifications.
pub const DEFAULT_PROGRESS_EVERY: u64 = 250_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertConfig {
    /// Size of the prefix sample (and hard capacity of the sample buffer).
    pub sample_rows: usize,

    /// Max distinct values a column may show in the sample and still get a dictionary.
    pub dictionary_threshold: usize,

    /// Emit a milestone event every this many rows written.
    pub progress_every: u64,

    /// Rows the Parquet adapter buffers before handing a record batch to the encoder.
    pub batch_rows: usize,

    /// Extension that replaces the input's to form the output path.
    pub output_extension: String,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            sample_rows: DEFAULT_SAMPLE_ROWS,
            dictionary_threshold: DEFAULT_DICTIONARY_THRESHOLD,
            progress_every: DEFAULT_PROGRESS_EVERY,
            batch_rows: 8192,
            output_extension: "parquet".to_string(),
        }
    }
}

impl ConvertConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `TABPQ_SAMPLE_ROWS`: rows sampled before deciding encodings
    /// - `TABPQ_DICT_THRESHOLD`: distinct-value threshold for dictionary encoding
    /// - `TABPQ_PROGRESS_EVERY`: rows between milestone events
    /// - `TABPQ_BATCH_ROWS`: rows per record batch handed to the Parquet encoder
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("TABPQ_SAMPLE_ROWS") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.sample_rows = v;
            }
        }

        if let Ok(s) = std::env::var("TABPQ_DICT_THRESHOLD") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.dictionary_threshold = v;
            }
        }

        if let Ok(s) = std::env::var("TABPQ_PROGRESS_EVERY") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.progress_every = v;
            }
        }

        if let Ok(s) = std::env::var("TABPQ_BATCH_ROWS") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.batch_rows = v;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<()> {
        if self.sample_rows == 0 {
            return Err(Error::Config("sample_rows must be at least 1".into()));
        }
        if self.progress_every == 0 {
            return Err(Error::Config("progress_every must be at least 1".into()));
        }
        if self.batch_rows == 0 {
            return Err(Error::Config("batch_rows must be at least 1".into()));
        }
        if self.output_extension.is_empty() || self.output_extension.contains('.') {
            return Err(Error::Config(format!(
                "output_extension must be a bare extension, got '{}'",
                self.output_extension
            )));
        }
        Ok(())
    }

    /// Output path for `input`: same directory and stem, extension replaced.
    ///
    /// Fails when the result would overwrite the input itself.
    pub fn output_path_for(&self, input: &Path) -> Result<PathBuf> {
        let out = input.with_extension(&self.output_extension);
        if out == input {
            return Err(Error::Config(format!(
                "output path {} would overwrite the input",
                out.display()
            )));
        }
        Ok(out)
    }
}

/// Page compression codec of the output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    Uncompressed,
    #[default]
    Snappy,
    Zstd,
}

impl Compression {
    pub const SUPPORTED: [Compression; 3] = [
        Compression::Uncompressed,
        Compression::Snappy,
        Compression::Zstd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::Uncompressed => "uncompressed",
            Compression::Snappy => "snappy",
            Compression::Zstd => "zstd",
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compression {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::SUPPORTED
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnsupportedCompression(s.to_string()))
    }
}
