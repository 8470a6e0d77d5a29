//! Archive sequence computation and reference formatting.
//!
//! Sequences are derived from the document store's current state at read
//! time. There is deliberately no in-memory counter: two processes racing
//! for the same `(category, year)` pair may compute the same candidate,
//! and the store's uniqueness check at save time rejects the loser.

use crate::error::{Error, Result};
use crate::models::ArchiveReference;
use crate::store::DocumentStore;

/// Next archive sequence for a category/year pair.
///
/// Reads the highest persisted sequence and adds one; 1 when no records
/// exist yet. Idempotent until a record with the returned sequence is
/// persisted.
pub fn next_sequence(store: &dyn DocumentStore, category: &str, year: i32) -> Result<u32> {
    let max = store
        .find_max_sequence(category, year)
        .map_err(|e| Error::PersistenceFailed(e.to_string()))?;
    Ok(max.map_or(1, |m| m + 1))
}

/// Format a stable reference string: `ARCH-{CAT}-{YY}-{SEQ}`.
///
/// The category contributes its first three letters, uppercased; the year
/// its last two digits; the sequence is zero-padded to four digits.
pub fn format_reference(category: &str, year: i32, sequence: u32) -> String {
    let prefix: String = category
        .chars()
        .filter(|c| c.is_alphabetic())
        .take(3)
        .collect::<String>()
        .to_uppercase();
    format!("ARCH-{}-{:02}-{:04}", prefix, year.rem_euclid(100), sequence)
}

/// Compute and format the next reference for a category/year pair.
pub fn next_reference(
    store: &dyn DocumentStore,
    category: &str,
    year: i32,
) -> Result<ArchiveReference> {
    let sequence = next_sequence(store, category, year)?;
    Ok(ArchiveReference {
        category: category.to_string(),
        year,
        sequence,
        formatted: format_reference(category, year, sequence),
    })
}
