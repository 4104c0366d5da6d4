//! Batch generation pipeline.
//!
//! # Pipeline Flow
//!
//! 1. **Task set**: descriptors built by [`crate::tasks::TaskSetBuilder`]
//! 2. **Dispatch**: the worker pool runs one generation call per descriptor
//! 3. **Collection**: outcomes land in id-ordered slots, failures as fallbacks
//! 4. **Persistence**: records are written as JSONL and digested
//!
//! # Example
//!
//! ```rust,ignore
//! use mail_forge::export::JsonlSink;
//! use mail_forge::pipeline::BatchPipeline;
//! use mail_forge::scheduler::WorkerPoolConfig;
//!
//! let pipeline = BatchPipeline::new(
//!     WorkerPoolConfig::new(5),
//!     generator,
//!     JsonlSink::new("synthetic_datasets/emails.jsonl"),
//! )?;
//! let summary = pipeline.run(tasks).await?;
//! println!("{} records ({} fallbacks)", summary.records, summary.fallbacks);
//! ```

pub mod runner;

pub use runner::{BatchPipeline, BatchSummary};
