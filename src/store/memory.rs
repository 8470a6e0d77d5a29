//! In-memory document store for tests and ephemeral runs.

use std::sync::Mutex;

use chrono::Datelike;

use crate::models::DocumentRecord;

use super::{DocumentStore, Result, StoreError};

/// Stores records in a mutex-guarded Vec. Behavior mirrors the SQLite
/// store, including reference-conflict rejection.
#[derive(Default)]
pub struct MemoryDocumentStore {
    records: Mutex<Vec<DocumentRecord>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all persisted records.
    pub fn records(&self) -> Vec<DocumentRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn save(&self, record: &DocumentRecord) -> Result<String> {
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.reference == record.reference) {
            return Err(StoreError::Conflict(record.reference.clone()));
        }
        records.push(record.clone());
        Ok(record.id.clone())
    }

    fn find_max_sequence(&self, category: &str, year: i32) -> Result<Option<u32>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.category == category && r.created_at.year() == year)
            .filter_map(|r| {
                r.scan_metadata
                    .box_number
                    .or(r.scan_metadata.folder_number)
            })
            .max())
    }

    fn reference_exists(&self, reference: &str) -> Result<bool> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().any(|r| r.reference == reference))
    }

    fn get(&self, id: &str) -> Result<Option<DocumentRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    fn count(&self) -> Result<u64> {
        Ok(self.records.lock().unwrap().len() as u64)
    }
}
