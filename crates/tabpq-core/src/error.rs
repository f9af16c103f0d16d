use std::path::PathBuf;

use thiserror::Error;

/// Canonical result for the converter.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open input {path:?}: {source}")]
    InputOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read header: {0}")]
    HeaderRead(String),

    /// `row` is the 1-based data row number (the header is not counted).
    #[error("malformed record at data row {row}: {reason}")]
    MalformedRecord { row: u64, reason: String },

    #[error("unsupported compression type '{0}' (expected one of: snappy, zstd, uncompressed)")]
    UnsupportedCompression(String),

    #[error("write failed: {0}")]
    Write(String),

    #[error("finalize failed: {0}")]
    Finalize(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}

impl Error {
    /// Short machine-friendly name of the variant, used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InputOpen { .. } => "input_open",
            Error::HeaderRead(_) => "header_read",
            Error::MalformedRecord { .. } => "malformed_record",
            Error::UnsupportedCompression(_) => "unsupported_compression",
            Error::Write(_) => "write",
            Error::Finalize(_) => "finalize",
            Error::Config(_) => "config",
            Error::Invariant(_) => "invariant",
        }
    }
}
