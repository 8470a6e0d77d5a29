//! Record assembly from scan, OCR, and user-supplied metadata.

use chrono::Utc;

use crate::classify;
use crate::models::{
    ArchiveReference, DocumentRecord, OcrData, OcrOutcome, ScanMetadata, ScanResult, UserMetadata,
};

/// Assemble a record from its parts. The reference is burned in here and
/// never reassigned.
///
/// A failed OCR outcome produces degraded `ocr_data` (empty fields, zero
/// confidence) instead of rejecting the record: scanned-but-unreadable
/// documents must still be archivable and auditable.
pub fn assemble_record(
    scan: &ScanResult,
    ocr: &OcrOutcome,
    meta: &UserMetadata,
    reference: &ArchiveReference,
    content_hash: String,
) -> DocumentRecord {
    let ocr_data = if ocr.success {
        OcrData {
            metadata: classify::classify(&ocr.text, &scan.filename),
            extracted_text: ocr.text.clone(),
            ocr_language: ocr.language.clone(),
        }
    } else {
        OcrData::degraded(&ocr.language)
    };

    DocumentRecord {
        id: uuid::Uuid::new_v4().to_string(),
        reference: reference.formatted.clone(),
        title: meta.title.clone(),
        description: meta.description.clone(),
        category: meta.category.clone(),
        priority: meta.priority.clone(),
        department: meta.department.clone(),
        tags: meta.tags.clone(),
        confidential: meta.confidential,
        original_name: meta.original_name.clone(),
        content_hash,
        file_path: scan.file_path.clone(),
        ocr_data,
        scan_metadata: ScanMetadata {
            device_id: scan.details.device_id.clone(),
            resolution_dpi: scan.details.resolution_dpi,
            format: scan.details.format.as_str().to_string(),
            scan_date: scan.details.captured_at,
            archive_location: meta.archive_location.clone(),
            box_number: Some(reference.sequence),
            folder_number: meta.folder_number,
        },
        created_at: Utc::now(),
    }
}
