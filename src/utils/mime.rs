//! MIME type detection and mapping for scan output files.

use std::path::Path;

use crate::models::ImageFormat;

/// Detect the MIME type of a file from its content, falling back to the
/// requested capture format when the content is unrecognizable.
pub fn detect_mime(path: &Path, fallback: ImageFormat) -> String {
    match infer::get_from_path(path) {
        Ok(Some(kind)) => kind.mime_type().to_string(),
        _ => fallback.mime_type().to_string(),
    }
}

/// Map MIME type to file extension.
pub fn mime_to_extension(mime: &str) -> &'static str {
    match mime {
        "application/pdf" => "pdf",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/tiff" => "tiff",
        "text/plain" => "txt",
        _ => "bin",
    }
}
