//! Streaming row sources.

pub mod tsv;
