//! mail-forge: synthetic email generation and LLM-judge evaluation.
//!
//! This library batch-generates synthetic emails through an external LLM with
//! bounded concurrency, guarantees exactly one ordered record per task, and
//! scores rewritten emails against their originals on three criteria.

// Core modules
pub mod cli;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod export;
pub mod generator;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod scheduler;
pub mod tasks;
pub mod utils;

// Re-export commonly used error types
pub use error::{EvaluationError, ExportError, GenerationError, LlmError, PipelineError, PoolError};
