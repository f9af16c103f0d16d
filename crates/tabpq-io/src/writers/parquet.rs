//! Parquet column writer adapter built on `parquet::arrow::ArrowWriter`.
//!
//! Rows are accumulated into per-column `StringBuilder`s and handed to the
//! encoder as a `RecordBatch` every `batch_rows` rows. Dictionary encoding is
//! switched off file-wide and re-enabled only for dictionary-eligible columns;
//! every Arrow field also carries its encoding tag as metadata, which the
//! writer embeds in the file footer with the Arrow schema.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use arrow_array::builder::StringBuilder;
use arrow_array::{ArrayRef, RecordBatch};
use arrow_schema::{DataType, Field as ArrowField, Schema as ArrowSchema, SchemaRef};
use parquet::arrow::ArrowWriter;
use parquet::basic::{Compression as ParquetCompression, ZstdLevel};
use parquet::file::properties::WriterProperties;
use parquet::schema::types::ColumnPath;

use tabpq_core::config::{Compression, ConvertConfig};
use tabpq_core::error::{Error, Result};
use tabpq_core::row::Row;
use tabpq_core::schema::{Schema, ENCODING_METADATA_KEY};
use tabpq_core::sink::{ColumnWriter, ColumnWriterAdapter};

/// Opens `ParquetColumnWriter`s on the local filesystem.
#[derive(Debug, Clone)]
pub struct ParquetAdapter {
    batch_rows: usize,
}

impl ParquetAdapter {
    pub fn new(batch_rows: usize) -> Self {
        Self {
            batch_rows: batch_rows.max(1),
        }
    }

    pub fn from_config(cfg: &ConvertConfig) -> Self {
        Self::new(cfg.batch_rows)
    }
}

impl Default for ParquetAdapter {
    fn default() -> Self {
        Self::from_config(&ConvertConfig::default())
    }
}

impl ColumnWriterAdapter for ParquetAdapter {
    type Writer = ParquetColumnWriter<File>;

    fn open(
        &self,
        path: &Path,
        schema: &Schema,
        compression: Compression,
    ) -> Result<Self::Writer> {
        let file = File::create(path)
            .map_err(|e| Error::Write(format!("create {}: {e}", path.display())))?;
        ParquetColumnWriter::try_new(file, schema, compression, self.batch_rows)
    }
}

pub struct ParquetColumnWriter<W: Write + Send> {
    writer: ArrowWriter<W>,
    arrow_schema: SchemaRef,
    builders: Vec<StringBuilder>,
    buffered: usize,
    batch_rows: usize,
}

impl<W: Write + Send> ParquetColumnWriter<W> {
    pub fn try_new(
        sink: W,
        schema: &Schema,
        compression: Compression,
        batch_rows: usize,
    ) -> Result<Self> {
        if schema.is_empty() {
            return Err(Error::Write("schema has no columns".into()));
        }
        // Per-column dictionary settings are keyed by column path.
        if let Some(name) = schema.duplicate_name() {
            return Err(Error::Write(format!("duplicate column name '{name}'")));
        }
        let arrow_schema = to_arrow_schema(schema);
        let props = writer_properties(schema, compression);
        let writer = ArrowWriter::try_new(sink, Arc::clone(&arrow_schema), Some(props))
            .map_err(|e| Error::Write(format!("open parquet writer: {e}")))?;
        let builders = (0..schema.len()).map(|_| StringBuilder::new()).collect();
        Ok(Self {
            writer,
            arrow_schema,
            builders,
            buffered: 0,
            batch_rows: batch_rows.max(1),
        })
    }

    fn flush_batch(&mut self) -> std::result::Result<(), String> {
        if self.buffered == 0 {
            return Ok(());
        }
        let columns: Vec<ArrayRef> = self
            .builders
            .iter_mut()
            .map(|b| Arc::new(b.finish()) as ArrayRef)
            .collect();
        let batch = RecordBatch::try_new(Arc::clone(&self.arrow_schema), columns)
            .map_err(|e| format!("build record batch: {e}"))?;
        self.writer
            .write(&batch)
            .map_err(|e| format!("encode record batch: {e}"))?;
        self.buffered = 0;
        Ok(())
    }
}

impl<W: Write + Send> ColumnWriter for ParquetColumnWriter<W> {
    fn write_row(&mut self, row: &Row) -> Result<()> {
        if row.len() != self.builders.len() {
            return Err(Error::Write(format!(
                "row has {} fields, schema has {}",
                row.len(),
                self.builders.len()
            )));
        }
        for (builder, value) in self.builders.iter_mut().zip(row.fields()) {
            builder.append_value(value);
        }
        self.buffered += 1;
        if self.buffered >= self.batch_rows {
            self.flush_batch().map_err(Error::Write)?;
        }
        Ok(())
    }

    fn finalize(mut self) -> Result<()> {
        self.flush_batch().map_err(Error::Finalize)?;
        self.writer
            .close()
            .map_err(|e| Error::Finalize(format!("close parquet writer: {e}")))?;
        Ok(())
    }
}

/// Non-null UTF-8 field per column, tagged with its encoding choice.
pub fn to_arrow_schema(schema: &Schema) -> SchemaRef {
    let fields: Vec<ArrowField> = schema
        .fields()
        .iter()
        .map(|f| {
            let metadata = HashMap::from([(
                ENCODING_METADATA_KEY.to_string(),
                f.encoding.tag().to_string(),
            )]);
            ArrowField::new(f.name.as_str(), DataType::Utf8, false).with_metadata(metadata)
        })
        .collect();
    Arc::new(ArrowSchema::new(fields))
}

pub fn writer_properties(schema: &Schema, compression: Compression) -> WriterProperties {
    let mut builder = WriterProperties::builder()
        .set_compression(parquet_codec(compression))
        .set_dictionary_enabled(false);
    for field in schema.fields().iter().filter(|f| f.encoding.is_dictionary()) {
        builder =
            builder.set_column_dictionary_enabled(ColumnPath::new(vec![field.name.clone()]), true);
    }
    builder.build()
}

fn parquet_codec(compression: Compression) -> ParquetCompression {
    match compression {
        Compression::Uncompressed => ParquetCompression::UNCOMPRESSED,
        Compression::Snappy => ParquetCompression::SNAPPY,
        Compression::Zstd => ParquetCompression::ZSTD(ZstdLevel::default()),
    }
}
