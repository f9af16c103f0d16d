//! Column writer adapter interface.
//!
//! The driver only relies on three operations: `open`, `write_row`, and
//! `finalize`. Writes must preserve order; `finalize` must flush durably.
//! Row-group sizing, page layout, and codecs are the adapter's business.

use std::path::Path;

use crate::config::Compression;
use crate::error::Result;
use crate::row::Row;
use crate::schema::Schema;

pub trait ColumnWriterAdapter {
    type Writer: ColumnWriter;

    /// Create the output container at `path` and return a writer for it.
    fn open(&self, path: &Path, schema: &Schema, compression: Compression)
        -> Result<Self::Writer>;
}

pub trait ColumnWriter {
    /// Append one row. `row.len()` equals the schema's column count.
    fn write_row(&mut self, row: &Row) -> Result<()>;

    /// Flush everything buffered and close the container.
    ///
    /// Dropping a writer without calling this leaves the output unfinished.
    fn finalize(self) -> Result<()>;
}
