//! Bounded concurrent dispatch of generation tasks.
//!
//! - **WorkerPool**: fixed number of workers draining a shared task list
//! - **OutcomeSlots**: id-ordered outcome storage, one slot per task
//!
//! # Architecture
//!
//! ```text
//!                  ┌──────────────────────┐
//!                  │ id-sorted task list  │
//!                  │  (atomic cursor)     │
//!                  └──────────┬───────────┘
//!                             │
//!         ┌───────────────────┼───────────────────┐
//!         ▼                   ▼                   ▼
//!    ┌─────────┐         ┌─────────┐         ┌─────────┐
//!    │ Worker 1│         │ Worker 2│         │ Worker N│
//!    └────┬────┘         └────┬────┘         └────┬────┘
//!         │                   │                   │
//!         └──────────► OutcomeSlots[i] ◄──────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use mail_forge::scheduler::{WorkerPool, WorkerPoolConfig};
//!
//! let pool = WorkerPool::new(WorkerPoolConfig::new(5))?;
//! let report = pool.run(tasks, generator).await?;
//! assert_eq!(report.outcomes.len(), submitted);
//! ```

pub mod collector;
pub mod worker_pool;

pub use collector::{order_tasks, OutcomeSlots};
pub use worker_pool::{DispatchReport, PoolStats, WorkerPool, WorkerPoolConfig};
