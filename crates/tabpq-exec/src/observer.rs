//! Conversion observer hooks.
//!
//! The driver never logs directly; it reports to an injected `ConvertObserver`.
//! `TracingObserver` forwards events to `tracing`; wire a subscriber in the
//! binary layer.

use std::path::Path;

use tabpq_core::config::Compression;
use tabpq_core::manifest::ConversionManifest;
use tabpq_core::schema::Schema;

/// Emitted once the schema is fixed, right before the output is created.
#[derive(Debug, Clone, Copy)]
pub struct InitEvent<'a> {
    pub input_path: &'a Path,
    pub output_path: &'a Path,
    pub header: &'a [String],
    pub schema: &'a Schema,
    pub compression: Compression,
    pub sampled_rows: usize,
    /// `--dict-field` names that match no header column.
    pub unmatched_forced: &'a [String],
}

pub trait ConvertObserver {
    fn on_initialize(&mut self, event: &InitEvent<'_>);

    /// Called every `progress_every` rows written, with the running total.
    fn on_milestone(&mut self, rows_written: u64);

    fn on_finish(&mut self, _manifest: &ConversionManifest) {}
}

impl<O: ConvertObserver + ?Sized> ConvertObserver for &mut O {
    fn on_initialize(&mut self, event: &InitEvent<'_>) {
        (**self).on_initialize(event)
    }

    fn on_milestone(&mut self, rows_written: u64) {
        (**self).on_milestone(rows_written)
    }

    fn on_finish(&mut self, manifest: &ConversionManifest) {
        (**self).on_finish(manifest)
    }
}

/// Structured `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ConvertObserver for TracingObserver {
    fn on_initialize(&mut self, event: &InitEvent<'_>) {
        let encodings: Vec<String> = event
            .schema
            .fields()
            .iter()
            .map(|f| format!("{}={}", f.name, f.encoding))
            .collect();
        tracing::info!(
            path = %event.input_path.display(),
            output = %event.output_path.display(),
            compression = %event.compression,
            sampled_rows = event.sampled_rows,
            headers = ?event.header,
            encodings = ?encodings,
            "tabpq.initialize"
        );
        for name in event.unmatched_forced {
            tracing::warn!(column = %name, "tabpq.dict_field_not_in_header");
        }
    }

    fn on_milestone(&mut self, rows_written: u64) {
        tracing::info!(num_rows = rows_written, "tabpq.milestone");
    }

    fn on_finish(&mut self, manifest: &ConversionManifest) {
        tracing::info!(
            output = %manifest.output_path.display(),
            num_rows = manifest.rows_written(),
            tail_rows = manifest.tail_rows,
            schema_hash = %manifest.schema_hash,
            duration_ms = manifest.duration_ms(),
            "tabpq.finish"
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl ConvertObserver for NullObserver {
    fn on_initialize(&mut self, _event: &InitEvent<'_>) {}
    fn on_milestone(&mut self, _rows_written: u64) {}
}

/// Owned copy of the initialization event, as kept by `RecordingObserver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedInit {
    pub header: Vec<String>,
    pub schema: Schema,
    pub compression: Compression,
    pub sampled_rows: usize,
    pub unmatched_forced: Vec<String>,
}

/// Keeps every event in memory; used by tests to assert on the side channel.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub init: Option<RecordedInit>,
    pub milestones: Vec<u64>,
    pub finished: Option<ConversionManifest>,
}

impl ConvertObserver for RecordingObserver {
    fn on_initialize(&mut self, event: &InitEvent<'_>) {
        self.init = Some(RecordedInit {
            header: event.header.to_vec(),
            schema: event.schema.clone(),
            compression: event.compression,
            sampled_rows: event.sampled_rows,
            unmatched_forced: event.unmatched_forced.to_vec(),
        });
    }

    fn on_milestone(&mut self, rows_written: u64) {
        self.milestones.push(rows_written);
    }

    fn on_finish(&mut self, manifest: &ConversionManifest) {
        self.finished = Some(manifest.clone());
    }
}
