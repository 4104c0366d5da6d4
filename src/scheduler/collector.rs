//! Outcome collection and ordering.
//!
//! Tasks are sorted by id before dispatch and each one is bound to a slot in
//! a pre-sized array. Workers write their outcome into the task's own slot as
//! they finish, in whatever order the external calls return. Reading the
//! slots front to back therefore yields outcomes in ascending id order, with
//! no separate sort step and no way to hold two outcomes for one task.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::PoolError;
use crate::generator::Outcome;
use crate::tasks::TaskDescriptor;

/// Sorts tasks by id (stable) and rejects duplicate ids.
///
/// The returned order defines slot indices for [`OutcomeSlots`].
pub fn order_tasks(mut tasks: Vec<TaskDescriptor>) -> Result<Vec<TaskDescriptor>, PoolError> {
    tasks.sort_by_key(TaskDescriptor::id);

    if let Some(pair) = tasks.windows(2).find(|pair| pair[0].id() == pair[1].id()) {
        return Err(PoolError::DuplicateTaskId(pair[0].id()));
    }

    Ok(tasks)
}

/// Pre-sized, id-ordered outcome storage shared by all workers.
#[derive(Debug)]
pub struct OutcomeSlots {
    expected_ids: Vec<u64>,
    slots: Mutex<Vec<Option<Outcome>>>,
    filled: AtomicUsize,
}

impl OutcomeSlots {
    /// Creates one empty slot per task, in the given (id-sorted) order.
    pub fn for_tasks(tasks: &[TaskDescriptor]) -> Self {
        Self {
            expected_ids: tasks.iter().map(TaskDescriptor::id).collect(),
            slots: Mutex::new(vec![None; tasks.len()]),
            filled: AtomicUsize::new(0),
        }
    }

    /// Number of slots (submitted tasks).
    pub fn len(&self) -> usize {
        self.expected_ids.len()
    }

    /// True when no tasks were submitted.
    pub fn is_empty(&self) -> bool {
        self.expected_ids.is_empty()
    }

    /// Number of slots filled so far.
    pub fn filled(&self) -> usize {
        self.filled.load(Ordering::SeqCst)
    }

    /// Stores the outcome for the task bound to `slot`.
    ///
    /// # Errors
    ///
    /// Fails if the outcome belongs to a different task or the slot already
    /// holds an outcome.
    pub fn fill(&self, slot: usize, outcome: Outcome) -> Result<(), PoolError> {
        let expected = self
            .expected_ids
            .get(slot)
            .copied()
            .ok_or(PoolError::SlotMismatch {
                slot,
                expected: 0,
                received: outcome.id(),
            })?;

        if outcome.id() != expected {
            return Err(PoolError::SlotMismatch {
                slot,
                expected,
                received: outcome.id(),
            });
        }

        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        if slots[slot].is_some() {
            return Err(PoolError::SlotAlreadyFilled {
                slot,
                task_id: expected,
            });
        }
        slots[slot] = Some(outcome);
        self.filled.fetch_add(1, Ordering::SeqCst);

        Ok(())
    }

    /// Consumes the slots, returning outcomes in ascending id order.
    ///
    /// # Errors
    ///
    /// Returns `OutcomeCountMismatch` if any slot is still empty. This means
    /// a task was dropped and the run must not be persisted.
    pub fn finish(self) -> Result<Vec<Outcome>, PoolError> {
        let expected = self.expected_ids.len();
        let slots = self.slots.into_inner().unwrap_or_else(|e| e.into_inner());

        let outcomes: Vec<Outcome> = slots.into_iter().flatten().collect();
        if outcomes.len() != expected {
            return Err(PoolError::OutcomeCountMismatch {
                expected,
                collected: outcomes.len(),
            });
        }

        Ok(outcomes)
    }
}
