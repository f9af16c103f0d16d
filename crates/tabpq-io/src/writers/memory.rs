//! In-memory column writer adapter for testing.
//!
//! Records what the driver asked for (path, schema, codec, rows, whether it
//! finalized) into a shared `MemoryTable` instead of encoding anything. No
//! file is ever created. `failing_after(n)` makes the writer reject the
//! write that follows the first `n` successful ones.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use tabpq_core::config::Compression;
use tabpq_core::error::{Error, Result};
use tabpq_core::row::Row;
use tabpq_core::schema::Schema;
use tabpq_core::sink::{ColumnWriter, ColumnWriterAdapter};

/// Everything a conversion handed to the adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryTable {
    pub path: Option<PathBuf>,
    pub schema: Option<Schema>,
    pub compression: Option<Compression>,
    pub rows: Vec<Row>,
    pub opened: usize,
    pub finalized: bool,
}

#[derive(Clone, Default)]
pub struct MemoryAdapter {
    table: Arc<Mutex<MemoryTable>>,
    fail_after: Option<usize>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter whose writer accepts `n` rows and fails on the next one.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    /// Copy of the recorded table.
    pub fn snapshot(&self) -> MemoryTable {
        lock(&self.table).clone()
    }

    pub fn rows(&self) -> Vec<Row> {
        lock(&self.table).rows.clone()
    }

    pub fn schema(&self) -> Option<Schema> {
        lock(&self.table).schema.clone()
    }

    pub fn is_finalized(&self) -> bool {
        lock(&self.table).finalized
    }

    pub fn was_opened(&self) -> bool {
        lock(&self.table).opened > 0
    }
}

// The table is plain data; a panic mid-update cannot leave it inconsistent.
fn lock(table: &Mutex<MemoryTable>) -> MutexGuard<'_, MemoryTable> {
    table.lock().unwrap_or_else(|e| e.into_inner())
}

impl ColumnWriterAdapter for MemoryAdapter {
    type Writer = MemoryWriter;

    fn open(&self, path: &Path, schema: &Schema, compression: Compression) -> Result<MemoryWriter> {
        let mut table = lock(&self.table);
        table.path = Some(path.to_path_buf());
        table.schema = Some(schema.clone());
        table.compression = Some(compression);
        table.rows.clear();
        table.finalized = false;
        table.opened += 1;
        Ok(MemoryWriter {
            table: Arc::clone(&self.table),
            width: schema.len(),
            fail_after: self.fail_after,
            written: 0,
        })
    }
}

pub struct MemoryWriter {
    table: Arc<Mutex<MemoryTable>>,
    width: usize,
    fail_after: Option<usize>,
    written: usize,
}

impl ColumnWriter for MemoryWriter {
    fn write_row(&mut self, row: &Row) -> Result<()> {
        if self.fail_after == Some(self.written) {
            return Err(Error::Write(format!(
                "injected failure after {} rows",
                self.written
            )));
        }
        if row.len() != self.width {
            return Err(Error::Write(format!(
                "row has {} fields, schema has {}",
                row.len(),
                self.width
            )));
        }
        lock(&self.table).rows.push(row.clone());
        self.written += 1;
        Ok(())
    }

    fn finalize(self) -> Result<()> {
        lock(&self.table).finalized = true;
        Ok(())
    }
}
