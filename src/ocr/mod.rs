//! OCR and text extraction.
//!
//! Extracts text from acquired files using:
//! - pdftotext (Poppler) for vector PDFs
//! - Tesseract OCR for image formats
//!
//! Both tools are external binaries invoked through the command runner;
//! either may be absent on a host, which degrades the outcome rather than
//! failing the pipeline.

pub mod confidence;
mod extractor;

pub use extractor::{OcrExtractor, OcrOptions};
