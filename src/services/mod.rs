//! Service layer for the digitization pipeline.
//!
//! Services wire authorization, auditing, pacing, and cancellation around
//! the leaf components. They can be driven by the CLI or embedded in a
//! larger record-management system.

pub mod archive;
pub mod scan;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use archive::ArchiveService;
pub use scan::{ScanService, ScanServiceConfig};

/// Cooperative cancellation for batch operations.
///
/// Checked between items, never mid-item: an in-flight capture or build
/// always runs to completion, and results produced before the cancellation
/// point are returned, not discarded.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
