//! Error types for mail-forge operations.
//!
//! Defines error types for the major subsystems:
//! - LLM API interactions
//! - Record generation (per task)
//! - Worker pool dispatch and outcome collection
//! - Dataset export and loading
//! - Evaluation aggregation

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("LLM response contained no content")]
    EmptyResponse,
}

/// A failed generation call for a single task descriptor.
///
/// Carries the descriptor id so a fallback record can be attributed to the
/// task it stands in for.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// Transport or service-side failure.
    #[error("generation request for task {task_id} failed: {cause}")]
    Transport { task_id: u64, cause: String },

    /// The service answered, but not with the expected JSON shape.
    #[error("generation output for task {task_id} was malformed: {cause}")]
    MalformedOutput { task_id: u64, cause: String },

    /// The call exceeded the per-call deadline.
    #[error("generation for task {task_id} timed out after {seconds} seconds")]
    Timeout { task_id: u64, seconds: u64 },

    /// The worker running the call panicked.
    #[error("generation worker for task {task_id} panicked: {cause}")]
    WorkerPanicked { task_id: u64, cause: String },
}

impl GenerationError {
    /// Id of the task whose generation failed.
    pub fn task_id(&self) -> u64 {
        match self {
            Self::Transport { task_id, .. }
            | Self::MalformedOutput { task_id, .. }
            | Self::Timeout { task_id, .. }
            | Self::WorkerPanicked { task_id, .. } => *task_id,
        }
    }

    /// Wraps an LLM error as a transport failure for `task_id`.
    pub fn from_llm(task_id: u64, err: LlmError) -> Self {
        match err {
            LlmError::ParseError(cause) => Self::MalformedOutput { task_id, cause },
            LlmError::EmptyResponse => Self::MalformedOutput {
                task_id,
                cause: LlmError::EmptyResponse.to_string(),
            },
            other => Self::Transport {
                task_id,
                cause: other.to_string(),
            },
        }
    }
}

/// Errors raised by the worker pool and the outcome collector.
///
/// Every variant here is an invariant violation: the pool recovers all
/// per-task failures into fallback records, so these only surface on
/// programming defects and must abort the run.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Concurrency limit must be greater than 0")]
    ZeroConcurrency,

    #[error("Task id {0} was submitted more than once")]
    DuplicateTaskId(u64),

    #[error("Outcome slot {slot} expected task {expected} but received task {received}")]
    SlotMismatch {
        slot: usize,
        expected: u64,
        received: u64,
    },

    #[error("Outcome slot {slot} (task {task_id}) was filled twice")]
    SlotAlreadyFilled { slot: usize, task_id: u64 },

    #[error("Collected {collected} outcomes for {expected} submitted tasks")]
    OutcomeCountMismatch { expected: usize, collected: usize },

    #[error("Worker task failed: {0}")]
    WorkerFailed(String),
}

/// Errors that can occur while writing or reading JSONL datasets.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Dataset file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to create output directory '{path}': {reason}")]
    DirectoryCreationFailed { path: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from a full batch pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Worker pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Reportable evaluation conditions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvaluationError {
    /// No record produced all three criterion scores.
    #[error("No valid samples evaluated for '{dataset}' ({examined} records examined)")]
    NoSamplesUsed { dataset: String, examined: usize },
}
