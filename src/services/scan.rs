//! Scan orchestration: single captures and paced sequential batches.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::audit::{AuditEvent, AuditSink};
use crate::auth::{Authorizer, Capability};
use crate::error::{Error, Result};
use crate::exec::{CommandError, CommandRunner};
use crate::models::{
    BatchOutcome, DeviceDescriptor, ScanDetails, ScanOptions, ScanResult, ScannerBackend,
};
use crate::scanner::{capture_command, stderr_is_warning_only, DriverRegistry};
use crate::utils::detect_mime;

use super::CancelFlag;

/// Configuration for the scan service.
#[derive(Debug, Clone)]
pub struct ScanServiceConfig {
    /// Directory scan output files are written under; created on demand.
    pub working_dir: PathBuf,
    /// Timeout applied to each capture invocation.
    pub capture_timeout: Duration,
    /// Timeout applied to each discovery probe.
    pub discovery_timeout: Duration,
    /// Pacing delay between batch items. Acquisition is serialized by
    /// hardware; hammering a single device driver is undefined behavior.
    pub batch_delay: Duration,
}

impl Default for ScanServiceConfig {
    fn default() -> Self {
        Self {
            working_dir: PathBuf::from("scans"),
            capture_timeout: Duration::from_secs(30),
            discovery_timeout: Duration::from_secs(10),
            batch_delay: Duration::from_millis(500),
        }
    }
}

/// Drives acquisition cycles against scanner devices.
pub struct ScanService {
    runner: Arc<dyn CommandRunner>,
    authorizer: Arc<dyn Authorizer>,
    audit: Arc<dyn AuditSink>,
    config: ScanServiceConfig,
}

impl ScanService {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        authorizer: Arc<dyn Authorizer>,
        audit: Arc<dyn AuditSink>,
        config: ScanServiceConfig,
    ) -> Self {
        Self {
            runner,
            authorizer,
            audit,
            config,
        }
    }

    fn authorize(&self, actor: &str, capability: Capability) -> Result<()> {
        if self.authorizer.is_authorized(actor, capability) {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                actor: actor.to_string(),
                capability,
            })
        }
    }

    /// Enumerate scanner devices across backends.
    pub async fn discover(&self, actor: &str) -> Result<Vec<DeviceDescriptor>> {
        self.authorize(actor, Capability::DocumentScan)?;
        DriverRegistry::new()
            .with_probe_timeout(self.config.discovery_timeout)
            .discover(self.runner.as_ref())
            .await
    }

    /// Capture a single scan from a device.
    pub async fn scan(
        &self,
        actor: &str,
        device_id: &str,
        options: &ScanOptions,
    ) -> Result<ScanResult> {
        self.authorize(actor, Capability::DocumentScan)?;

        let result = self.capture_once(device_id, options).await;
        let (succeeded, failed) = match &result {
            Ok(_) => (1, 0),
            Err(_) => (0, 1),
        };
        self.audit
            .record(AuditEvent::new(actor, "scan", device_id, succeeded, failed));
        result
    }

    /// Capture `count` scans sequentially with pacing between items.
    ///
    /// A failure on item k never aborts items k+1..count; every attempt is
    /// recorded by ordinal in submission order. Cancellation is honored
    /// between items only.
    pub async fn scan_batch(
        &self,
        actor: &str,
        device_id: &str,
        count: usize,
        options: &ScanOptions,
        cancel: &CancelFlag,
    ) -> Result<BatchOutcome<ScanResult>> {
        self.authorize(actor, Capability::DocumentScan)?;
        if device_id.is_empty() {
            return Err(Error::DeviceNotFound("empty device id".to_string()));
        }
        if count == 0 {
            return Err(Error::Config("batch count must be at least 1".to_string()));
        }

        let mut outcome = BatchOutcome::new();

        for ordinal in 1..=count {
            if cancel.is_cancelled() {
                tracing::info!("scan batch cancelled after {} items", outcome.attempted());
                outcome.cancelled = true;
                break;
            }

            let result = self.capture_once(device_id, options).await;
            if let Err(e) = &result {
                tracing::warn!("scan {}/{} failed: {}", ordinal, count, e);
            }
            outcome.push(ordinal, result);

            if ordinal < count {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }

        self.audit.record(AuditEvent::new(
            actor,
            "scan_batch",
            device_id,
            outcome.succeeded,
            outcome.failed,
        ));
        Ok(outcome)
    }

    /// One capture attempt: invoke the backend tool, then verify the
    /// output file on disk.
    async fn capture_once(&self, device_id: &str, options: &ScanOptions) -> Result<ScanResult> {
        if device_id.is_empty() {
            return Err(Error::DeviceNotFound("empty device id".to_string()));
        }

        std::fs::create_dir_all(&self.config.working_dir)?;

        let captured_at = Utc::now();
        let mut millis = captured_at.timestamp_millis();
        let mut output_path = self
            .config
            .working_dir
            .join(format!("scan-{}.{}", millis, options.format.extension()));
        while output_path.exists() {
            millis += 1;
            output_path = self
                .config
                .working_dir
                .join(format!("scan-{}.{}", millis, options.format.extension()));
        }

        let backend = ScannerBackend::for_device(device_id);
        let (program, args) = capture_command(backend, device_id, options, &output_path);

        let output = match self
            .runner
            .run(&program, &args, self.config.capture_timeout)
            .await
        {
            Ok(output) => output,
            Err(CommandError::NotFound(tool)) => {
                return Err(Error::CaptureFailed {
                    device_id: device_id.to_string(),
                    reason: format!("{} not installed", tool),
                })
            }
            Err(e) => {
                return Err(Error::CaptureFailed {
                    device_id: device_id.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        if !output.success() {
            return Err(Error::CaptureFailed {
                device_id: device_id.to_string(),
                reason: if output.stderr.trim().is_empty() {
                    format!("capture tool exited with {:?}", output.exit_code)
                } else {
                    output.stderr.trim().to_string()
                },
            });
        }

        if !output.stderr.trim().is_empty() {
            if stderr_is_warning_only(&output.stderr) {
                tracing::debug!("capture warnings: {}", output.stderr.trim());
            } else {
                tracing::warn!("capture stderr: {}", output.stderr.trim());
            }
        }

        // Size comes from the filesystem, not the tool's own report.
        let metadata = std::fs::metadata(&output_path).map_err(|_| Error::CaptureFailed {
            device_id: device_id.to_string(),
            reason: "capture tool produced no output file".to_string(),
        })?;

        let filename = output_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(ScanResult {
            mime_type: detect_mime(&output_path, options.format),
            file_path: output_path,
            filename,
            file_size_bytes: metadata.len(),
            details: ScanDetails {
                device_id: device_id.to_string(),
                resolution_dpi: options.resolution_dpi,
                format: options.format,
                quality_percent: options.quality_percent,
                page_size: options.page_size.clone(),
                color_mode: options.color_mode,
                captured_at,
            },
        })
    }
}
