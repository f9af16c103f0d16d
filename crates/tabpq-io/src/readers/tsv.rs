//! Tab-delimited row source.
//!
//! Wraps `csv::Reader` with a tab delimiter. The reader is not flexible: once
//! the header fixes the field count, a record with a different count is an
//! error rather than being padded or truncated.
//!
//! Quoting is strict. The `csv` parser accepts a bare `"` inside an unquoted
//! field and lets an unclosed quote run to end of input, so the raw bytes of
//! every record are kept until the record is parsed and then checked: a quote
//! may only open a field, and a closing quote must be followed by a tab or the
//! end of the line.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::rc::Rc;

use csv::{ReaderBuilder, StringRecord};
use tabpq_core::error::{Error, Result};
use tabpq_core::row::Row;
use tabpq_core::source::RowSource;

/// Passes reads through and keeps a copy of the bytes until the record that
/// holds them has been checked.
struct Capture<R> {
    inner: R,
    seen: Rc<RefCell<VecDeque<u8>>>,
}

impl<R: Read> Read for Capture<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.seen.borrow_mut().extend(&buf[..n]);
        Ok(n)
    }
}

pub struct TsvRowSource<R: Read> {
    reader: csv::Reader<Capture<R>>,
    seen: Rc<RefCell<VecDeque<u8>>>,
    /// Byte offset of the first captured byte not yet checked.
    checked_to: u64,
    record: StringRecord,
    header_read: bool,
    rows_read: u64,
}

impl TsvRowSource<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::InputOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_reader(file))
    }
}

impl<R: Read> TsvRowSource<R> {
    pub fn from_reader(reader: R) -> Self {
        let seen = Rc::new(RefCell::new(VecDeque::new()));
        let capture = Capture {
            inner: reader,
            seen: Rc::clone(&seen),
        };
        let reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(false)
            .from_reader(capture);
        Self {
            reader,
            seen,
            checked_to: 0,
            record: StringRecord::new(),
            header_read: false,
            rows_read: 0,
        }
    }

    /// Consume the first record as the header. Must be called exactly once,
    /// before any `next_row`.
    ///
    /// Column names must be distinct: the writer addresses columns by name.
    pub fn read_header(&mut self) -> Result<Vec<String>> {
        if self.header_read {
            return Err(Error::Invariant("header already consumed".into()));
        }
        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                self.check_raw_record().map_err(Error::HeaderRead)?;
                let header: Vec<String> = self.record.iter().map(str::to_owned).collect();
                let mut names = HashSet::with_capacity(header.len());
                if let Some(dup) = header.iter().find(|name| !names.insert(name.as_str())) {
                    return Err(Error::HeaderRead(format!("duplicate column name '{dup}'")));
                }
                self.header_read = true;
                Ok(header)
            }
            Ok(false) => Err(Error::HeaderRead("input is empty".into())),
            Err(e) => Err(Error::HeaderRead(e.to_string())),
        }
    }

    /// Check the quoting of the record just parsed against its raw bytes.
    fn check_raw_record(&mut self) -> std::result::Result<(), String> {
        let end = self.reader.position().byte();
        let len = usize::try_from(end.saturating_sub(self.checked_to))
            .map_err(|_| "record too large".to_string())?;
        let mut seen = self.seen.borrow_mut();
        if len > seen.len() {
            return Err(format!(
                "record spans {len} bytes but only {} were read",
                seen.len()
            ));
        }
        self.checked_to = end;
        check_quotes(seen.drain(..len)).map_err(str::to_string)
    }
}

impl<R: Read> RowSource for TsvRowSource<R> {
    fn next_row(&mut self) -> Result<Option<Row>> {
        if !self.header_read {
            return Err(Error::Invariant(
                "read_header must be called before next_row".into(),
            ));
        }
        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                self.rows_read += 1;
                let row = self.rows_read;
                self.check_raw_record()
                    .map_err(|reason| Error::MalformedRecord { row, reason })?;
                Ok(Some(self.record.iter().collect()))
            }
            Ok(false) => Ok(None),
            Err(e) => Err(Error::MalformedRecord {
                row: self.rows_read + 1,
                reason: e.to_string(),
            }),
        }
    }

    fn rows_read(&self) -> u64 {
        self.rows_read
    }
}

#[derive(Clone, Copy)]
enum Quoting {
    FieldStart,
    Unquoted,
    Quoted,
    /// A `"` seen inside a quoted field: either an escape or the close.
    QuoteInQuoted,
}

/// Strict quote rules over one record's raw bytes. Leading line terminators
/// belong to blank lines or a CRLF split and are skipped.
fn check_quotes(bytes: impl IntoIterator<Item = u8>) -> std::result::Result<(), &'static str> {
    let mut state = Quoting::FieldStart;
    let bytes = bytes
        .into_iter()
        .skip_while(|b| matches!(b, b'\n' | b'\r'));
    for b in bytes {
        state = match (state, b) {
            (Quoting::Quoted, b'"') => Quoting::QuoteInQuoted,
            (Quoting::Quoted, _) => Quoting::Quoted,
            (Quoting::QuoteInQuoted, b'"') => Quoting::Quoted,
            (_, b'\t') => Quoting::FieldStart,
            (_, b'\n' | b'\r') => return Ok(()),
            (Quoting::FieldStart, b'"') => Quoting::Quoted,
            (Quoting::QuoteInQuoted, _) => return Err("unexpected character after closing quote"),
            (Quoting::Unquoted, b'"') => return Err("bare quote in unquoted field"),
            (Quoting::FieldStart | Quoting::Unquoted, _) => Quoting::Unquoted,
        };
    }
    match state {
        Quoting::Quoted => Err("quoted field is never closed"),
        _ => Ok(()),
    }
}
