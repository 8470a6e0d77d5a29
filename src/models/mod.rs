//! Data models for the digitization pipeline.

mod batch;
mod device;
mod record;
mod scan;

pub use batch::{BatchItem, BatchOutcome};
pub use device::{DeviceDescriptor, ScannerBackend};
pub use record::{
    ArchiveReference, DocumentRecord, ExtractedMetadata, OcrData, OcrOutcome, ScanMetadata,
    UserMetadata,
};
pub use scan::{ColorMode, ImageFormat, ScanDetails, ScanOptions, ScanResult};
