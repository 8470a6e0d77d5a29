//! Error taxonomy for the digitization pipeline.
//!
//! Per-item failures inside batch operations are captured in
//! [`crate::models::BatchOutcome`] and never propagated out of the batch
//! call; only operation-wide preconditions (authorization, missing
//! parameters) abort before the first item is attempted.

use thiserror::Error;

use crate::auth::Capability;

/// Errors that can occur in the digitization pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The actor lacks the capability required for this operation.
    #[error("{actor} is not authorized for {capability}")]
    Unauthorized { actor: String, capability: Capability },

    /// No scanner matches the requested device, or no backend responded.
    #[error("scanner device not found: {0}")]
    DeviceNotFound(String),

    /// The capture command failed for one scan attempt.
    #[error("capture failed on {device_id}: {reason}")]
    CaptureFailed { device_id: String, reason: String },

    /// The OCR engine binary is not present on this host.
    #[error("engine not installed")]
    EngineUnavailable,

    /// Text extraction ran but did not produce usable output.
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// The archive reference was taken by a concurrent writer.
    #[error("archive reference already assigned: {0}")]
    SequenceConflict(String),

    /// The document store rejected the record.
    #[error("failed to persist record: {0}")]
    PersistenceFailed(String),

    /// Invalid configuration or missing required parameter.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
