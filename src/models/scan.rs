//! Scan configuration and acquisition results.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output image format for capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Tiff,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Tiff => "tiff",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "tiff" | "tif" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// File extension used for scan output files.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Tiff => "tiff",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Tiff => "image/tiff",
        }
    }
}

/// Color mode requested from the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    Color,
    Grayscale,
    Monochrome,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Grayscale => "grayscale",
            Self::Monochrome => "monochrome",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "color" | "colour" => Some(Self::Color),
            "grayscale" | "gray" | "grey" => Some(Self::Grayscale),
            "monochrome" | "mono" | "lineart" => Some(Self::Monochrome),
            _ => None,
        }
    }

    /// The mode name scanimage expects.
    pub fn sane_mode(&self) -> &'static str {
        match self {
            Self::Color => "Color",
            Self::Grayscale => "Gray",
            Self::Monochrome => "Lineart",
        }
    }
}

/// Recognized capture options with their defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    pub resolution_dpi: u32,
    pub format: ImageFormat,
    pub quality_percent: u8,
    pub page_size: String,
    pub color_mode: ColorMode,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            resolution_dpi: 300,
            format: ImageFormat::Jpeg,
            quality_percent: 90,
            page_size: "A4".to_string(),
            color_mode: ColorMode::Color,
        }
    }
}

/// Settings one capture actually ran with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanDetails {
    pub device_id: String,
    pub resolution_dpi: u32,
    pub format: ImageFormat,
    pub quality_percent: u8,
    pub page_size: String,
    pub color_mode: ColorMode,
    pub captured_at: DateTime<Utc>,
}

/// One acquired scan on disk.
///
/// Owned exclusively by the caller until handed to the OCR extractor;
/// never mutated after creation, and never reused across two OCR results.
/// `file_size_bytes` is read from the filesystem, not trusted from the
/// capture tool's own report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub file_path: PathBuf,
    pub filename: String,
    pub file_size_bytes: u64,
    pub mime_type: String,
    pub details: ScanDetails,
}
