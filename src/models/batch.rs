//! Per-ordinal batch outcomes.
//!
//! Batches never throw out of the loop: each item's result is collected
//! independently, in submission order, and the summary always satisfies
//! `succeeded + failed == attempted`.

use crate::error::Error;

/// Outcome of one item within a batch, tagged by its 1-based ordinal.
#[derive(Debug)]
pub struct BatchItem<T> {
    pub ordinal: usize,
    pub outcome: Result<T, Error>,
}

/// Collected result of a batch operation.
#[derive(Debug, Default)]
pub struct BatchOutcome<T> {
    /// Per-item outcomes in submission order.
    pub items: Vec<BatchItem<T>>,
    pub succeeded: usize,
    pub failed: usize,
    /// True when the batch was cancelled before all items were attempted.
    pub cancelled: bool,
}

impl<T> BatchOutcome<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            succeeded: 0,
            failed: 0,
            cancelled: false,
        }
    }

    /// Record one item outcome, keeping the counters in step.
    pub fn push(&mut self, ordinal: usize, outcome: Result<T, Error>) {
        match &outcome {
            Ok(_) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
        self.items.push(BatchItem { ordinal, outcome });
    }

    /// Number of items actually attempted.
    pub fn attempted(&self) -> usize {
        self.items.len()
    }
}
