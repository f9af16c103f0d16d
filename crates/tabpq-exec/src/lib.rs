#![forbid(unsafe_code)]
//! tabpq-exec: cardinality sampling, encoding policy, and the conversion driver.
//!
//! A conversion reads a bounded prefix into memory, fixes the schema from it,
//! then streams the prefix and the rest of the input through a column writer
//! adapter one row at a time.

pub mod observer;
pub mod pipeline;
pub mod policy;
pub mod sampler;

pub use observer::{ConvertObserver, NullObserver, RecordingObserver, TracingObserver};
pub use pipeline::{ConversionPlan, Converter};
