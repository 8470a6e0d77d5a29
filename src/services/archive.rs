//! Record building: the scan-to-archive transition.

use std::sync::Arc;

use chrono::{Datelike, Utc};

use crate::archive::{assemble_record, next_reference};
use crate::audit::{AuditEvent, AuditSink};
use crate::auth::{Authorizer, Capability};
use crate::error::{Error, Result};
use crate::exec::CommandRunner;
use crate::models::{BatchOutcome, DocumentRecord, ScanResult, UserMetadata};
use crate::ocr::{OcrExtractor, OcrOptions};
use crate::store::{DocumentStore, StoreError};

use super::CancelFlag;

/// Builds and persists archive records from acquired scans.
pub struct ArchiveService {
    store: Arc<dyn DocumentStore>,
    runner: Arc<dyn CommandRunner>,
    authorizer: Arc<dyn Authorizer>,
    audit: Arc<dyn AuditSink>,
    extractor: OcrExtractor,
    ocr_options: OcrOptions,
}

impl ArchiveService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        runner: Arc<dyn CommandRunner>,
        authorizer: Arc<dyn Authorizer>,
        audit: Arc<dyn AuditSink>,
        extractor: OcrExtractor,
        ocr_options: OcrOptions,
    ) -> Self {
        Self {
            store,
            runner,
            authorizer,
            audit,
            extractor,
            ocr_options,
        }
    }

    fn authorize(&self, actor: &str) -> Result<()> {
        if self.authorizer.is_authorized(actor, Capability::DocumentUpload) {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                actor: actor.to_string(),
                capability: Capability::DocumentUpload,
            })
        }
    }

    /// Build and persist one record from a scan.
    ///
    /// OCR failure is recoverable: the record is archived with degraded
    /// metadata rather than rejected.
    pub async fn build_record(
        &self,
        actor: &str,
        scan: &ScanResult,
        meta: &UserMetadata,
    ) -> Result<DocumentRecord> {
        self.authorize(actor)?;

        let result = self.build_one(scan, meta).await;
        let (succeeded, failed) = match &result {
            Ok(_) => (1, 0),
            Err(_) => (0, 1),
        };
        self.audit.record(AuditEvent::new(
            actor,
            "archive_record",
            &meta.category,
            succeeded,
            failed,
        ));
        result
    }

    /// Build records for a whole scan batch.
    ///
    /// Already-failed scan items pass through as failures without OCR.
    /// The template's title and original name are suffixed with each
    /// item's 1-based ordinal. Per-item failures never abort the batch.
    pub async fn build_records(
        &self,
        actor: &str,
        scans: BatchOutcome<ScanResult>,
        template: &UserMetadata,
        cancel: &CancelFlag,
    ) -> Result<BatchOutcome<DocumentRecord>> {
        self.authorize(actor)?;
        if template.category.is_empty() {
            return Err(Error::Config("category is required".to_string()));
        }

        let mut outcome = BatchOutcome::new();

        for item in scans.items {
            if cancel.is_cancelled() {
                tracing::info!(
                    "record batch cancelled after {} items",
                    outcome.attempted()
                );
                outcome.cancelled = true;
                break;
            }

            let result = match item.outcome {
                // Capture already failed; nothing to extract.
                Err(e) => Err(e),
                Ok(scan) => {
                    let meta = template.for_ordinal(item.ordinal);
                    self.build_one(&scan, &meta).await
                }
            };
            if let Err(e) = &result {
                tracing::warn!("record build for item {} failed: {}", item.ordinal, e);
            }
            outcome.push(item.ordinal, result);
        }

        self.audit.record(AuditEvent::new(
            actor,
            "archive_batch",
            &template.category,
            outcome.succeeded,
            outcome.failed,
        ));
        Ok(outcome)
    }

    async fn build_one(&self, scan: &ScanResult, meta: &UserMetadata) -> Result<DocumentRecord> {
        if meta.category.is_empty() {
            return Err(Error::Config("category is required".to_string()));
        }

        let ocr = self
            .extractor
            .extract(
                self.runner.as_ref(),
                &scan.file_path,
                &scan.mime_type,
                &self.ocr_options,
            )
            .await;

        let content_hash = std::fs::read(&scan.file_path)
            .map(|bytes| DocumentRecord::compute_hash(&bytes))
            .unwrap_or_default();

        let year = Utc::now().year();
        let reference = next_reference(self.store.as_ref(), &meta.category, year)?;
        let record = assemble_record(scan, &ocr, meta, &reference, content_hash);

        match self.store.save(&record) {
            Ok(_) => Ok(record),
            Err(StoreError::Conflict(reference)) => Err(Error::SequenceConflict(reference)),
            Err(e) => Err(Error::PersistenceFailed(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::MemoryAuditSink;
    use crate::auth::AllowAll;
    use crate::exec::test_support::ScriptedRunner;
    use crate::exec::{CommandError, CommandOutput};
    use crate::models::{ColorMode, ImageFormat, ScanDetails};
    use crate::store::MemoryDocumentStore;
    use std::path::Path;

    fn scan_fixture(dir: &Path, name: &str) -> ScanResult {
        let file_path = dir.join(name);
        std::fs::write(&file_path, b"image bytes").unwrap();
        ScanResult {
            file_path,
            filename: name.to_string(),
            file_size_bytes: 11,
            mime_type: "image/jpeg".to_string(),
            details: ScanDetails {
                device_id: "epson2:libusb:001:004".to_string(),
                resolution_dpi: 300,
                format: ImageFormat::Jpeg,
                quality_percent: 90,
                page_size: "A4".to_string(),
                color_mode: ColorMode::Color,
                captured_at: Utc::now(),
            },
        }
    }

    fn template() -> UserMetadata {
        UserMetadata {
            title: "Filing".to_string(),
            description: "Scanned filing".to_string(),
            category: "Finance".to_string(),
            priority: "normal".to_string(),
            department: "Accounting".to_string(),
            tags: vec![],
            confidential: false,
            original_name: None,
            archive_location: None,
            folder_number: None,
        }
    }

    fn service(
        store: Arc<MemoryDocumentStore>,
        runner: Arc<dyn CommandRunner>,
        audit: Arc<MemoryAuditSink>,
    ) -> ArchiveService {
        ArchiveService::new(
            store,
            runner,
            Arc::new(AllowAll),
            audit,
            OcrExtractor::new(),
            OcrOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_build_record_with_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryDocumentStore::new());
        let runner = Arc::new(ScriptedRunner::new(|_, _| {
            Ok(CommandOutput::ok(
                "Invoice #2291 for services rendered. Total amount $450.00.",
            ))
        }));
        let svc = service(store.clone(), runner, Arc::new(MemoryAuditSink::new()));

        let record = svc
            .build_record("alice", &scan_fixture(dir.path(), "scan-1.jpg"), &template())
            .await
            .unwrap();

        assert_eq!(record.ocr_data.metadata.document_type, "Invoice");
        assert!(record.reference.starts_with("ARCH-FIN-"));
        assert!(record.reference.ends_with("-0001"));
        assert!(!record.content_hash.is_empty());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_engine_unavailable_still_archives() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryDocumentStore::new());
        let runner = Arc::new(ScriptedRunner::new(|program, _| {
            Err(CommandError::NotFound(program.to_string()))
        }));
        let svc = service(store.clone(), runner, Arc::new(MemoryAuditSink::new()));

        let record = svc
            .build_record("alice", &scan_fixture(dir.path(), "scan-1.jpg"), &template())
            .await
            .unwrap();

        assert_eq!(record.ocr_data.metadata.confidence, 0);
        assert!(record.ocr_data.extracted_text.is_empty());
        // Reference is still assigned and unique
        assert!(record.reference.starts_with("ARCH-FIN-"));
        assert!(store.reference_exists(&record.reference).unwrap());
    }

    #[tokio::test]
    async fn test_sequences_advance_across_builds() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryDocumentStore::new());
        let runner = Arc::new(ScriptedRunner::new(|_, _| {
            Ok(CommandOutput::ok("General text content."))
        }));
        let svc = service(store.clone(), runner, Arc::new(MemoryAuditSink::new()));

        let first = svc
            .build_record("alice", &scan_fixture(dir.path(), "scan-1.jpg"), &template())
            .await
            .unwrap();
        let second = svc
            .build_record("alice", &scan_fixture(dir.path(), "scan-2.jpg"), &template())
            .await
            .unwrap();

        assert!(first.reference.ends_with("-0001"));
        assert!(second.reference.ends_with("-0002"));
    }

    #[tokio::test]
    async fn test_bulk_titles_and_order_with_failed_item() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryDocumentStore::new());
        let runner = Arc::new(ScriptedRunner::new(|_, _| {
            Ok(CommandOutput::ok("Payment receipt. Total amount $12.00."))
        }));
        let svc = service(store.clone(), runner, Arc::new(MemoryAuditSink::new()));

        let mut scans: BatchOutcome<ScanResult> = BatchOutcome::new();
        scans.push(1, Ok(scan_fixture(dir.path(), "scan-1.jpg")));
        scans.push(
            2,
            Err(Error::CaptureFailed {
                device_id: "dev".to_string(),
                reason: "paper jam".to_string(),
            }),
        );
        scans.push(3, Ok(scan_fixture(dir.path(), "scan-3.jpg")));

        let outcome = svc
            .build_records("alice", scans, &template(), &CancelFlag::new())
            .await
            .unwrap();

        assert_eq!(outcome.attempted(), 3);
        assert_eq!(outcome.succeeded, 2);
        assert_eq!(outcome.failed, 1);

        let first = outcome.items[0].outcome.as_ref().unwrap();
        assert_eq!(first.title, "Filing - Document 1");
        assert!(outcome.items[1].outcome.is_err());
        let third = outcome.items[2].outcome.as_ref().unwrap();
        assert_eq!(third.title, "Filing - Document 3");
    }

    #[tokio::test]
    async fn test_bulk_audit_counts() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryDocumentStore::new());
        let runner = Arc::new(ScriptedRunner::new(|_, _| {
            Ok(CommandOutput::ok("Some text."))
        }));
        let audit = Arc::new(MemoryAuditSink::new());
        let svc = service(store, runner, audit.clone());

        let mut scans: BatchOutcome<ScanResult> = BatchOutcome::new();
        scans.push(1, Ok(scan_fixture(dir.path(), "scan-1.jpg")));
        scans.push(
            2,
            Err(Error::CaptureFailed {
                device_id: "dev".to_string(),
                reason: "jam".to_string(),
            }),
        );

        svc.build_records("alice", scans, &template(), &CancelFlag::new())
            .await
            .unwrap();

        let events = audit.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].operation, "archive_batch");
        assert_eq!(events[0].succeeded + events[0].failed, 2);
    }

    #[tokio::test]
    async fn test_bulk_passthrough_skips_ocr_for_failed_scans() {
        let store = Arc::new(MemoryDocumentStore::new());
        let runner = Arc::new(ScriptedRunner::new(|_, _| {
            panic!("failed scan items must not reach the OCR engine")
        }));
        let svc = service(store, runner.clone(), Arc::new(MemoryAuditSink::new()));

        let mut scans: BatchOutcome<ScanResult> = BatchOutcome::new();
        scans.push(
            1,
            Err(Error::CaptureFailed {
                device_id: "dev".to_string(),
                reason: "jam".to_string(),
            }),
        );

        let outcome = svc
            .build_records("alice", scans, &template(), &CancelFlag::new())
            .await
            .unwrap();
        assert_eq!(outcome.failed, 1);
        assert_eq!(runner.call_count(), 0);
    }

    #[tokio::test]
    async fn test_conflict_is_rejected_not_renumbered() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(MemoryDocumentStore::new());
        let runner = Arc::new(ScriptedRunner::new(|_, _| {
            Ok(CommandOutput::ok("Some text."))
        }));
        let svc = service(store.clone(), runner, Arc::new(MemoryAuditSink::new()));

        let record = svc
            .build_record("alice", &scan_fixture(dir.path(), "scan-1.jpg"), &template())
            .await
            .unwrap();

        // A racing writer lands on the same reference: the store rejects it
        // instead of renumbering.
        let mut duplicate = record.clone();
        duplicate.id = uuid::Uuid::new_v4().to_string();
        let result = store.save(&duplicate);
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }
}
