//! Document store collaborator seam.
//!
//! The pipeline only needs three questions answered: persist a record,
//! report the highest archive sequence for a category/year pair, and check
//! whether a reference is already taken. The sequence query is always
//! answered from current store state, never from an in-process counter, so
//! concurrent processes and restarts never collide.

mod memory;
mod sqlite;

use thiserror::Error;

use crate::models::DocumentRecord;

pub use memory::MemoryDocumentStore;
pub use sqlite::SqliteDocumentStore;

/// Errors surfaced by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record's reference collides with an existing one.
    #[error("reference already exists: {0}")]
    Conflict(String),

    #[error("store backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// External document store.
pub trait DocumentStore: Send + Sync {
    /// Persist a record, returning its id.
    ///
    /// Uniqueness of the archive reference is re-verified here; a taken
    /// reference is a [`StoreError::Conflict`], never a silent renumber.
    fn save(&self, record: &DocumentRecord) -> Result<String>;

    /// Highest box/folder sequence among records in `category` whose
    /// creation date falls inside `year`. None when no records match.
    fn find_max_sequence(&self, category: &str, year: i32) -> Result<Option<u32>>;

    /// Whether an archive reference is already assigned.
    fn reference_exists(&self, reference: &str) -> Result<bool>;

    /// Load a record by id.
    fn get(&self, id: &str) -> Result<Option<DocumentRecord>>;

    /// Total persisted records.
    fn count(&self) -> Result<u64>;
}
