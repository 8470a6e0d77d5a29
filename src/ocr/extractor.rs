//! Text extraction from acquired files using pdftotext and Tesseract.
//!
//! Vector PDFs go through direct text extraction; image formats go through
//! the external OCR engine. A missing engine is a recoverable condition:
//! the extractor reports a failed outcome and downstream record building
//! continues with degraded metadata.

use std::path::Path;
use std::time::Duration;

use crate::error::Error;
use crate::exec::{CommandError, CommandRunner};
use crate::models::OcrOutcome;

use super::confidence;

/// Recognized extraction options.
#[derive(Debug, Clone)]
pub struct OcrOptions {
    /// Tesseract language code.
    pub language: String,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
        }
    }
}

/// Extractor that drives the external text-recognition tools.
pub struct OcrExtractor {
    timeout: Duration,
}

impl Default for OcrExtractor {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
        }
    }
}

impl OcrExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-invocation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extract text from a file based on its MIME type.
    ///
    /// Never returns an error: every failure mode is folded into a failed
    /// [`OcrOutcome`] with zero confidence so the caller can archive the
    /// scan anyway.
    pub async fn extract(
        &self,
        runner: &dyn CommandRunner,
        file_path: &Path,
        mime_type: &str,
        options: &OcrOptions,
    ) -> OcrOutcome {
        let result = match mime_type {
            "application/pdf" => self.run_pdftotext(runner, file_path).await,
            m if m.starts_with("image/") => {
                self.run_tesseract(runner, file_path, &options.language).await
            }
            other => Err(Error::ExtractionFailed(format!(
                "unsupported file type: {}",
                other
            ))),
        };

        match result {
            Ok(text) => OcrOutcome {
                success: true,
                confidence_score: confidence::score(&text),
                text,
                language: options.language.clone(),
                error_reason: None,
            },
            Err(e) => {
                tracing::debug!("text extraction failed for {}: {}", file_path.display(), e);
                OcrOutcome::failed(&options.language, e.to_string())
            }
        }
    }

    /// Run Tesseract OCR on an image.
    ///
    /// `--psm 6` hints a uniform block of text, which matches flatbed
    /// scans of office documents.
    async fn run_tesseract(
        &self,
        runner: &dyn CommandRunner,
        image_path: &Path,
        language: &str,
    ) -> Result<String, Error> {
        let args = vec![
            image_path.display().to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            language.to_string(),
            "--psm".to_string(),
            "6".to_string(),
        ];

        let output = match runner.run("tesseract", &args, self.timeout).await {
            Ok(output) => output,
            Err(CommandError::NotFound(_)) => return Err(Error::EngineUnavailable),
            Err(e) => return Err(Error::ExtractionFailed(e.to_string())),
        };

        if output.success() {
            Ok(output.stdout)
        } else {
            Err(Error::ExtractionFailed(format!(
                "tesseract failed: {}",
                output.stderr.trim()
            )))
        }
    }

    /// Run pdftotext on a PDF file, writing to stdout.
    async fn run_pdftotext(
        &self,
        runner: &dyn CommandRunner,
        file_path: &Path,
    ) -> Result<String, Error> {
        let args = vec![
            "-layout".to_string(),
            "-enc".to_string(),
            "UTF-8".to_string(),
            file_path.display().to_string(),
            "-".to_string(),
        ];

        let output = match runner.run("pdftotext", &args, self.timeout).await {
            Ok(output) => output,
            Err(CommandError::NotFound(_)) => {
                return Err(Error::ExtractionFailed(
                    "pdftotext not installed".to_string(),
                ))
            }
            Err(e) => return Err(Error::ExtractionFailed(e.to_string())),
        };

        if output.success() {
            Ok(output.stdout)
        } else {
            Err(Error::ExtractionFailed(format!(
                "pdftotext failed: {}",
                output.stderr.trim()
            )))
        }
    }

    /// Check if required external tools are available.
    pub fn check_tools() -> Vec<(String, bool)> {
        ["tesseract", "pdftotext"]
            .iter()
            .map(|tool| (tool.to_string(), crate::exec::check_binary(tool)))
            .collect()
    }
}
