//! Archive records assembled from scan, OCR, and user-supplied metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Text recognition output for one file.
///
/// Derived and immutable. The confidence score is a deterministic,
/// rule-based heuristic (see [`crate::ocr::confidence`]), not a
/// statistical probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrOutcome {
    pub success: bool,
    pub text: String,
    pub confidence_score: u8,
    pub language: String,
    pub error_reason: Option<String>,
}

impl OcrOutcome {
    /// Failure outcome carrying zero confidence and no text.
    pub fn failed(language: &str, reason: String) -> Self {
        Self {
            success: false,
            text: String::new(),
            confidence_score: 0,
            language: language.to_string(),
            error_reason: Some(reason),
        }
    }
}

/// Metadata derived from extracted text by pattern rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    pub document_type: String,
    /// At most 10 tokens, frequency-ranked.
    pub keywords: Vec<String>,
    pub date_references: Vec<String>,
    pub organization_references: Vec<String>,
    pub monetary_values: Vec<String>,
    pub confidence: u8,
}

/// OCR-derived portion of a persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrData {
    #[serde(flatten)]
    pub metadata: ExtractedMetadata,
    pub extracted_text: String,
    pub ocr_language: String,
}

impl OcrData {
    /// Degraded data for a scan whose OCR failed outright.
    ///
    /// Scanned-but-unreadable documents must still be archivable, so every
    /// field is empty and confidence is zero rather than the record being
    /// rejected.
    pub fn degraded(language: &str) -> Self {
        Self {
            metadata: ExtractedMetadata::default(),
            extracted_text: String::new(),
            ocr_language: language.to_string(),
        }
    }
}

/// Acquisition details carried on a persisted record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub device_id: String,
    pub resolution_dpi: u32,
    pub format: String,
    pub scan_date: DateTime<Utc>,
    pub archive_location: Option<String>,
    /// Physical box number; holds the archive sequence for boxed records.
    pub box_number: Option<u32>,
    pub folder_number: Option<u32>,
}

/// User-supplied fields for a record, or the template for a bulk build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMetadata {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub department: String,
    pub tags: Vec<String>,
    pub confidential: bool,
    pub original_name: Option<String>,
    pub archive_location: Option<String>,
    pub folder_number: Option<u32>,
}

impl UserMetadata {
    /// Template instance for the 1-based ordinal of a bulk build.
    ///
    /// Title and original name are suffixed deterministically so records
    /// from one batch stay distinguishable and ordered.
    pub fn for_ordinal(&self, ordinal: usize) -> Self {
        let mut meta = self.clone();
        meta.title = format!("{} - Document {}", self.title, ordinal);
        if let Some(name) = &self.original_name {
            meta.original_name = Some(format!("{} - Document {}", name, ordinal));
        }
        meta
    }
}

/// A stable, human-readable identifier tying a digitized record to a
/// physical storage location and a sequence number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveReference {
    pub category: String,
    pub year: i32,
    pub sequence: u32,
    pub formatted: String,
}

/// The persisted outcome of one scan-to-archive transition.
///
/// The `reference` is assigned exactly once at build time and is stable
/// thereafter; all other fields remain editable by downstream
/// record-management flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub reference: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub department: String,
    pub tags: Vec<String>,
    pub confidential: bool,
    pub original_name: Option<String>,
    /// SHA-256 of the scanned file content.
    pub content_hash: String,
    pub file_path: PathBuf,
    pub ocr_data: OcrData,
    pub scan_metadata: ScanMetadata,
    pub created_at: DateTime<Utc>,
}

impl DocumentRecord {
    /// Compute SHA-256 hash of content.
    pub fn compute_hash(content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hex::encode(hasher.finalize())
    }
}
