//! Pipeline driver: sample → decide → open → replay → stream tail → finalize.
//!
//! Sequencing rules:
//! - The schema is fixed before the output exists and never changes after.
//! - The compression flag is validated before the output is created, so a
//!   bad flag leaves nothing on disk.
//! - Sample rows are replayed in read order, immediately followed by the tail
//!   in read order, which reproduces the input order exactly.
//! - A failed write returns without finalizing. The partial output is left
//!   behind as-is; the writer's file handle is released on drop.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tabpq_core::config::{Compression, ConvertConfig};
use tabpq_core::error::{Error, Result};
use tabpq_core::manifest::ConversionManifest;
use tabpq_core::row::Row;
use tabpq_core::schema::Schema;
use tabpq_core::sink::{ColumnWriter, ColumnWriterAdapter};
use tabpq_core::source::RowSource;
use tabpq_io::TsvRowSource;

use crate::observer::{ConvertObserver, InitEvent};
use crate::policy::decide;
use crate::sampler::{sample, Sample};

/// Per-column summary of what the sampler saw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSummary {
    pub name: String,
    /// Capped at `dictionary_threshold + 1`.
    pub distinct_count: usize,
    pub saturated: bool,
    pub forced: bool,
}

/// Encoding decision for an input, computed without writing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub header: Vec<String>,
    pub schema: Schema,
    pub columns: Vec<ColumnSummary>,
    pub sampled_rows: usize,
    /// The whole input fit in the sample.
    pub input_exhausted: bool,
    pub unmatched_forced: Vec<String>,
}

/// Owns the configuration, the writer adapter, and the observer for a run.
pub struct Converter<A: ColumnWriterAdapter, O: ConvertObserver> {
    cfg: ConvertConfig,
    adapter: A,
    observer: O,
}

impl<A: ColumnWriterAdapter, O: ConvertObserver> Converter<A, O> {
    pub fn new(cfg: ConvertConfig, adapter: A, observer: O) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            cfg,
            adapter,
            observer,
        })
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.cfg
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Run the sampling and policy steps only.
    pub fn explain(&self, input: &Path, forced: &[String]) -> Result<ConversionPlan> {
        let mut source = TsvRowSource::open(input)?;
        let header = source.read_header()?;
        let output_path = self.cfg.output_path_for(input)?;
        let sampled = self.sample(&mut source, &header, forced)?;
        let input_exhausted = !sampled.buffer.is_full() || source.next_row()?.is_none();
        let schema = decide(&header, &sampled.verdicts());
        let columns = sampled
            .profiles
            .iter()
            .map(|p| ColumnSummary {
                name: p.name().to_string(),
                distinct_count: p.distinct_count(),
                saturated: p.is_saturated(),
                forced: p.is_forced(),
            })
            .collect();
        Ok(ConversionPlan {
            input_path: input.to_path_buf(),
            output_path,
            unmatched_forced: unmatched(&header, forced),
            header,
            schema,
            columns,
            sampled_rows: sampled.buffer.len(),
            input_exhausted,
        })
    }

    /// Convert the TSV file at `input` to a Parquet file next to it.
    ///
    /// `compression` is one of `snappy`, `zstd`, `uncompressed`.
    pub fn convert(
        &mut self,
        input: &Path,
        forced: &[String],
        compression: &str,
    ) -> Result<ConversionManifest> {
        let mut source = TsvRowSource::open(input)?;
        let header = source.read_header()?;
        self.convert_source(&mut source, header, input, forced, compression)
    }

    /// Same as [`Converter::convert`], for a source whose header has already
    /// been consumed. `input` only names the output and the manifest.
    pub fn convert_source<S: RowSource>(
        &mut self,
        mut source: S,
        header: Vec<String>,
        input: &Path,
        forced: &[String],
        compression: &str,
    ) -> Result<ConversionManifest> {
        let started_ms = now_ms();

        let sampled = self.sample(&mut source, &header, forced)?;
        let schema = decide(&header, &sampled.verdicts());
        let mut buffer = sampled.buffer;

        let compression: Compression = compression.parse()?;
        let output_path = self.cfg.output_path_for(input)?;

        let unmatched_forced = unmatched(&header, forced);
        self.observer.on_initialize(&InitEvent {
            input_path: input,
            output_path: &output_path,
            header: &header,
            schema: &schema,
            compression,
            sampled_rows: buffer.len(),
            unmatched_forced: &unmatched_forced,
        });

        let mut writer = self.adapter.open(&output_path, &schema, compression)?;
        let mut progress = Progress::new(self.cfg.progress_every);
        let width = schema.len();

        let mut sampled_rows = 0u64;
        while let Some(row) = buffer.pop_front() {
            writer.write_row(&row)?;
            sampled_rows += 1;
            progress.tick(&mut self.observer);
        }
        drop(buffer);

        let mut tail_rows = 0u64;
        while let Some(row) = source.next_row()? {
            check_width(&row, width, source.rows_read())?;
            writer.write_row(&row)?;
            tail_rows += 1;
            progress.tick(&mut self.observer);
        }

        writer.finalize()?;

        let manifest =
            ConversionManifest::new(input.to_path_buf(), output_path, compression, schema, started_ms)
                .finish(sampled_rows, tail_rows, now_ms());
        self.observer.on_finish(&manifest);
        Ok(manifest)
    }

    fn sample<S: RowSource>(
        &self,
        source: &mut S,
        header: &[String],
        forced: &[String],
    ) -> Result<Sample> {
        sample(
            source,
            header,
            self.cfg.sample_rows,
            self.cfg.dictionary_threshold,
            forced,
        )
    }
}

/// Counts written rows and fires a milestone every `every` rows.
struct Progress {
    written: u64,
    every: u64,
}

impl Progress {
    fn new(every: u64) -> Self {
        Self { written: 0, every }
    }

    fn tick<O: ConvertObserver>(&mut self, observer: &mut O) {
        self.written += 1;
        if self.written % self.every == 0 {
            observer.on_milestone(self.written);
        }
    }
}

fn check_width(row: &Row, width: usize, row_number: u64) -> Result<()> {
    if row.len() != width {
        return Err(Error::MalformedRecord {
            row: row_number,
            reason: format!("found {} fields, expected {}", row.len(), width),
        });
    }
    Ok(())
}

fn unmatched(header: &[String], forced: &[String]) -> Vec<String> {
    forced
        .iter()
        .filter(|name| !header.contains(*name))
        .cloned()
        .collect()
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
