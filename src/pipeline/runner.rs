//! Batch generation run: dispatch, collect, persist.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::PipelineError;
use crate::export::JsonlSink;
use crate::generator::{Outcome, RecordGenerator, ResultRecord};
use crate::scheduler::{PoolStats, WorkerPool, WorkerPoolConfig};
use crate::tasks::TaskDescriptor;

/// Result of one completed batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    /// Records written (always equal to the number of descriptors).
    pub records: usize,
    /// Records that are fallbacks.
    pub fallbacks: usize,
    pub elapsed: Duration,
    pub output_path: PathBuf,
    /// SHA-256 of the written file, hex encoded.
    pub sha256: String,
    pub peak_in_flight: usize,
    pub finished_at: DateTime<Utc>,
}

/// Runs a task set through the worker pool and writes the ordered records.
pub struct BatchPipeline {
    pool: WorkerPool,
    generator: Arc<dyn RecordGenerator>,
    sink: JsonlSink,
}

impl BatchPipeline {
    /// # Errors
    ///
    /// Returns `PipelineError::Pool` if the pool configuration is invalid.
    pub fn new(
        config: WorkerPoolConfig,
        generator: Arc<dyn RecordGenerator>,
        sink: JsonlSink,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            pool: WorkerPool::new(config)?,
            generator,
            sink,
        })
    }

    pub fn concurrency(&self) -> usize {
        self.pool.num_workers()
    }

    /// Generates one record per descriptor and writes them in id order.
    ///
    /// Nothing is written if outcome collection violates the one-record-
    /// per-task invariant.
    pub async fn run(&self, tasks: Vec<TaskDescriptor>) -> Result<BatchSummary, PipelineError> {
        let run_id = Uuid::new_v4();
        tracing::info!(
            run_id = %run_id,
            tasks = tasks.len(),
            concurrency = self.pool.num_workers(),
            output = %self.sink.path().display(),
            "Starting batch generation"
        );

        let report = self.pool.run(tasks, Arc::clone(&self.generator)).await?;
        let fallbacks = report.outcomes.iter().filter(|o| o.is_fallback()).count();
        let records: Vec<ResultRecord> = report
            .outcomes
            .into_iter()
            .map(Outcome::into_record)
            .collect();

        let written = self.sink.write(&records)?;
        let summary = summarize(run_id, &report.stats, fallbacks, written.sha256, written.path);

        tracing::info!(
            run_id = %run_id,
            records = written.records,
            fallbacks,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            sha256 = %summary.sha256,
            "Batch generation complete"
        );

        Ok(summary)
    }
}

fn summarize(
    run_id: Uuid,
    stats: &PoolStats,
    fallbacks: usize,
    sha256: String,
    output_path: PathBuf,
) -> BatchSummary {
    BatchSummary {
        run_id,
        records: stats.tasks_submitted,
        fallbacks,
        elapsed: stats.elapsed,
        output_path,
        sha256,
        peak_in_flight: stats.peak_in_flight,
        finished_at: Utc::now(),
    }
}
