//! Shared helpers for the conversion integration tests.

#![allow(dead_code)]

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow_array::{Array, StringArray};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::file::metadata::ParquetMetaData;

/// A decoded Parquet file: header, per-field metadata tag, rows.
pub struct Decoded {
    pub header: Vec<String>,
    pub encoding_tags: Vec<Option<String>>,
    pub rows: Vec<Vec<String>>,
    pub metadata: Arc<ParquetMetaData>,
}

impl Decoded {
    /// Whether any row group wrote a dictionary page for column `idx`.
    pub fn has_dictionary_page(&self, idx: usize) -> bool {
        self.metadata
            .row_groups()
            .iter()
            .any(|rg| rg.column(idx).dictionary_page_offset().is_some())
    }
}

pub fn write_tsv(dir: &Path, name: &str, header: &[&str], rows: &[Vec<String>]) -> PathBuf {
    let mut text = header.join("\t");
    text.push('\n');
    for row in rows {
        text.push_str(&row.join("\t"));
        text.push('\n');
    }
    let path = dir.join(name);
    fs::write(&path, text).expect("write tsv");
    path
}

pub fn read_parquet(path: &Path) -> Decoded {
    let file = File::open(path).expect("open parquet");
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).expect("parquet footer");
    let metadata = Arc::clone(builder.metadata());
    let schema = Arc::clone(builder.schema());
    let header = schema.fields().iter().map(|f| f.name().clone()).collect();
    let encoding_tags = schema
        .fields()
        .iter()
        .map(|f| f.metadata().get("tabpq.encoding").cloned())
        .collect();

    let mut rows = Vec::new();
    for batch in builder.build().expect("reader") {
        let batch = batch.expect("batch");
        let cols: Vec<&StringArray> = batch
            .columns()
            .iter()
            .map(|c| c.as_any().downcast_ref::<StringArray>().expect("utf8 column"))
            .collect();
        for r in 0..batch.num_rows() {
            rows.push(cols.iter().map(|c| c.value(r).to_string()).collect());
        }
    }
    Decoded {
        header,
        encoding_tags,
        rows,
        metadata,
    }
}

pub fn strings(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|s| s.to_string()).collect()
}
