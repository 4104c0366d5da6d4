//! Dataset persistence.
//!
//! Records are written as newline-delimited JSON and read back leniently:
//! a corrupt line is skipped without aborting the read.

pub mod jsonl;

pub use jsonl::{read_jsonl, JsonlRead, JsonlSink, SinkReport};
