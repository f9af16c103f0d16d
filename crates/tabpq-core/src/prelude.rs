//! Convenient re-exports for downstream crates.

pub use crate::config::{Compression, ConvertConfig};
pub use crate::error::{Error, Result};
pub use crate::hash::Hash256;
pub use crate::manifest::ConversionManifest;
pub use crate::row::Row;
pub use crate::schema::{EncodingChoice, Field, Schema};
pub use crate::sink::{ColumnWriter, ColumnWriterAdapter};
pub use crate::source::{RowSource, VecRowSource};
