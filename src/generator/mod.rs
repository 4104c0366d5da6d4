//! Record generation.
//!
//! The [`RecordGenerator`] trait is the boundary to the external generation
//! service: one call per task descriptor, no retries, failures returned as
//! [`GenerationError`]. [`LlmRecordGenerator`] is the live implementation;
//! the worker pool only ever sees the trait.

mod email;
mod record;

use async_trait::async_trait;

use crate::error::GenerationError;
use crate::tasks::TaskDescriptor;

pub use email::LlmRecordGenerator;
pub use record::{Outcome, RawRecord, ResultRecord};

/// Produces one raw record for one task descriptor.
#[async_trait]
pub trait RecordGenerator: Send + Sync {
    /// Generates the record for `task`.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` on transport failure or malformed output.
    async fn generate(&self, task: &TaskDescriptor) -> Result<RawRecord, GenerationError>;
}
