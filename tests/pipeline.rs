//! End-to-end pipeline tests with scripted external tools.
//!
//! The whole scan-to-archive flow runs against a scripted command runner
//! and an in-memory document store, so no scanner hardware or OCR binary
//! is needed.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use paperflow::audit::MemoryAuditSink;
use paperflow::auth::{AllowAll, DenyAll};
use paperflow::error::Error;
use paperflow::exec::test_support::ScriptedRunner;
use paperflow::exec::{CommandError, CommandOutput};
use paperflow::models::{ScanOptions, UserMetadata};
use paperflow::ocr::{OcrExtractor, OcrOptions};
use paperflow::services::{ArchiveService, CancelFlag, ScanService, ScanServiceConfig};
use paperflow::store::{DocumentStore, MemoryDocumentStore};

fn write_output_file(args: &[String]) {
    let path = args
        .iter()
        .position(|a| a == "-o")
        .map(|i| args[i + 1].clone())
        .expect("capture command carries an output path");
    std::fs::write(path, b"fake image bytes").unwrap();
}

fn template() -> UserMetadata {
    UserMetadata {
        title: "Vendor Invoices".to_string(),
        description: "Scanned vendor invoices".to_string(),
        category: "Finance".to_string(),
        priority: "normal".to_string(),
        department: "Accounting".to_string(),
        tags: vec!["vendor".to_string()],
        confidential: false,
        original_name: None,
        archive_location: None,
        folder_number: None,
    }
}

fn scan_service(runner: Arc<dyn paperflow::exec::CommandRunner>, dir: &std::path::Path) -> ScanService {
    ScanService::new(
        runner,
        Arc::new(AllowAll),
        Arc::new(MemoryAuditSink::new()),
        ScanServiceConfig {
            working_dir: dir.to_path_buf(),
            capture_timeout: Duration::from_secs(5),
            discovery_timeout: Duration::from_secs(5),
            batch_delay: Duration::from_millis(0),
        },
    )
}

#[tokio::test]
async fn scan_to_archive_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let capture_attempts = Arc::new(AtomicUsize::new(0));
    let attempts = capture_attempts.clone();

    // Scanner fails on captures 2 and 4; OCR reads invoices.
    let runner = Arc::new(ScriptedRunner::new(move |program, args| match program {
        "scanimage" => {
            let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 2 || n == 4 {
                Ok(CommandOutput {
                    stdout: String::new(),
                    stderr: "scanimage: sane_start: Document feeder jammed".to_string(),
                    exit_code: Some(1),
                })
            } else {
                write_output_file(args);
                Ok(CommandOutput::ok(""))
            }
        }
        "tesseract" => Ok(CommandOutput::ok(
            "Invoice #2291 for services rendered. Total amount $450.00 due to Acme Corp.",
        )),
        other => panic!("unexpected tool invocation: {}", other),
    }));

    let scans = scan_service(runner.clone(), dir.path());
    let store = Arc::new(MemoryDocumentStore::new());
    let audit = Arc::new(MemoryAuditSink::new());
    let archive = ArchiveService::new(
        store.clone(),
        runner,
        Arc::new(AllowAll),
        audit.clone(),
        OcrExtractor::new(),
        OcrOptions::default(),
    );

    let cancel = CancelFlag::new();
    let captured = scans
        .scan_batch(
            "records-clerk",
            "epson2:libusb:001:004",
            5,
            &ScanOptions::default(),
            &cancel,
        )
        .await
        .unwrap();

    assert_eq!(captured.attempted(), 5);
    assert_eq!(captured.succeeded, 3);
    assert_eq!(captured.failed, 2);

    let outcome = archive
        .build_records("records-clerk", captured, &template(), &cancel)
        .await
        .unwrap();

    // Failed captures pass through as failures; order is preserved.
    assert_eq!(outcome.attempted(), 5);
    assert_eq!(outcome.succeeded, 3);
    assert_eq!(outcome.failed, 2);
    let ordinals: Vec<usize> = outcome.items.iter().map(|i| i.ordinal).collect();
    assert_eq!(ordinals, vec![1, 2, 3, 4, 5]);

    // Titles carry the batch ordinal even around failures.
    let first = outcome.items[0].outcome.as_ref().unwrap();
    assert_eq!(first.title, "Vendor Invoices - Document 1");
    let fifth = outcome.items[4].outcome.as_ref().unwrap();
    assert_eq!(fifth.title, "Vendor Invoices - Document 5");

    // OCR metadata flowed through classification.
    assert_eq!(first.ocr_data.metadata.document_type, "Invoice");
    assert!(first
        .ocr_data
        .metadata
        .monetary_values
        .contains(&"$450.00".to_string()));

    // References are sequential within the category and unique.
    use chrono::Datelike;
    let expected_first = format!("ARCH-FIN-{:02}-0001", chrono::Utc::now().year() % 100);
    assert_eq!(first.reference, expected_first);
    assert!(fifth.reference.ends_with("-0003"));
    assert_eq!(store.count().unwrap(), 3);

    // One audit event for the record batch with consistent counts.
    let events = audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].operation, "archive_batch");
    assert_eq!(events[0].succeeded + events[0].failed, 5);
}

#[tokio::test]
async fn engine_unavailable_degrades_but_archives() {
    let dir = tempfile::tempdir().unwrap();

    let runner = Arc::new(ScriptedRunner::new(|program, args| match program {
        "scanimage" => {
            write_output_file(args);
            Ok(CommandOutput::ok(""))
        }
        // OCR engine is not installed on this host
        _ => Err(CommandError::NotFound(program.to_string())),
    }));

    let scans = scan_service(runner.clone(), dir.path());
    let store = Arc::new(MemoryDocumentStore::new());
    let archive = ArchiveService::new(
        store.clone(),
        runner,
        Arc::new(AllowAll),
        Arc::new(MemoryAuditSink::new()),
        OcrExtractor::new(),
        OcrOptions::default(),
    );

    let scan = scans
        .scan("records-clerk", "epson2:libusb:001:004", &ScanOptions::default())
        .await
        .unwrap();

    let record = archive
        .build_record("records-clerk", &scan, &template())
        .await
        .unwrap();

    assert_eq!(record.ocr_data.metadata.confidence, 0);
    assert_eq!(record.ocr_data.extracted_text, "");
    assert!(record.reference.starts_with("ARCH-FIN-"));
    assert!(store.reference_exists(&record.reference).unwrap());
}

#[tokio::test]
async fn denial_blocks_before_any_process() {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::new(|_, _| {
        panic!("no process may run for a denied actor")
    }));

    let service = ScanService::new(
        runner.clone(),
        Arc::new(DenyAll),
        Arc::new(MemoryAuditSink::new()),
        ScanServiceConfig {
            working_dir: dir.path().to_path_buf(),
            capture_timeout: Duration::from_secs(5),
            discovery_timeout: Duration::from_secs(5),
            batch_delay: Duration::from_millis(0),
        },
    );

    let discover = service.discover("intruder").await;
    assert!(matches!(discover, Err(Error::Unauthorized { .. })));

    let batch = service
        .scan_batch(
            "intruder",
            "epson2:libusb:001:004",
            3,
            &ScanOptions::default(),
            &CancelFlag::new(),
        )
        .await;
    assert!(matches!(batch, Err(Error::Unauthorized { .. })));
    assert_eq!(runner.call_count(), 0);
}

#[tokio::test]
async fn cancellation_returns_partial_results() {
    let dir = tempfile::tempdir().unwrap();
    let cancel = CancelFlag::new();
    let cancel_inside = cancel.clone();
    let captures = Arc::new(AtomicUsize::new(0));
    let captures_inside = captures.clone();

    let runner = Arc::new(ScriptedRunner::new(move |_, args| {
        write_output_file(args);
        // Request cancellation while the second capture is in flight.
        if captures_inside.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
            cancel_inside.cancel();
        }
        Ok(CommandOutput::ok(""))
    }));

    let service = scan_service(runner, dir.path());
    let outcome = service
        .scan_batch(
            "records-clerk",
            "epson2:libusb:001:004",
            10,
            &ScanOptions::default(),
            &cancel,
        )
        .await
        .unwrap();

    // Items produced before the cancellation point are returned.
    assert!(outcome.cancelled);
    assert_eq!(outcome.attempted(), 2);
    assert_eq!(outcome.succeeded, 2);
}
