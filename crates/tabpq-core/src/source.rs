//! Row source interface.
//!
//! The concrete TSV reader lives in `tabpq-io`. The header is consumed before a
//! source is handed to the sampler and is never yielded by `next_row`.

use crate::error::Result;
use crate::row::Row;

pub trait RowSource {
    /// Next data row, or `None` at end of input.
    ///
    /// Parse or I/O failures surface as `Error::MalformedRecord`.
    fn next_row(&mut self) -> Result<Option<Row>>;

    /// Number of data rows yielded so far.
    fn rows_read(&self) -> u64;
}

impl<S: RowSource + ?Sized> RowSource for &mut S {
    fn next_row(&mut self) -> Result<Option<Row>> {
        (**self).next_row()
    }

    fn rows_read(&self) -> u64 {
        (**self).rows_read()
    }
}

/// A source over rows already in memory. Handy for tests and benches.
pub struct VecRowSource {
    rows: std::vec::IntoIter<Row>,
    read: u64,
}

impl VecRowSource {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
            read: 0,
        }
    }
}

impl RowSource for VecRowSource {
    fn next_row(&mut self) -> Result<Option<Row>> {
        let row = self.rows.next();
        if row.is_some() {
            self.read += 1;
        }
        Ok(row)
    }

    fn rows_read(&self) -> u64 {
        self.read
    }
}
