//! Configuration management for paperflow.
//!
//! Settings load from an optional TOML file (`paperflow.toml` in the data
//! directory unless overridden), with serde defaults covering every field
//! so a missing file means a fully default configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{ColorMode, ImageFormat, ScanOptions};
use crate::ocr::OcrOptions;
use crate::services::ScanServiceConfig;

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("paperflow"))
        .unwrap_or_else(|| PathBuf::from(".paperflow"))
}

fn default_resolution() -> u32 {
    300
}

fn default_format() -> String {
    "jpeg".to_string()
}

fn default_quality() -> u8 {
    90
}

fn default_page_size() -> String {
    "A4".to_string()
}

fn default_color_mode() -> String {
    "color".to_string()
}

fn default_batch_delay_ms() -> u64 {
    500
}

fn default_capture_timeout_secs() -> u64 {
    30
}

fn default_discovery_timeout_secs() -> u64 {
    10
}

fn default_language() -> String {
    "eng".to_string()
}

fn default_ocr_timeout_secs() -> u64 {
    60
}

/// Capture defaults and pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSection {
    #[serde(default = "default_resolution")]
    pub resolution_dpi: u32,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_quality")]
    pub quality_percent: u8,
    #[serde(default = "default_page_size")]
    pub page_size: String,
    #[serde(default = "default_color_mode")]
    pub color_mode: String,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    #[serde(default = "default_capture_timeout_secs")]
    pub capture_timeout_secs: u64,
    #[serde(default = "default_discovery_timeout_secs")]
    pub discovery_timeout_secs: u64,
}

impl Default for ScanSection {
    fn default() -> Self {
        Self {
            resolution_dpi: default_resolution(),
            format: default_format(),
            quality_percent: default_quality(),
            page_size: default_page_size(),
            color_mode: default_color_mode(),
            batch_delay_ms: default_batch_delay_ms(),
            capture_timeout_secs: default_capture_timeout_secs(),
            discovery_timeout_secs: default_discovery_timeout_secs(),
        }
    }
}

/// OCR engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrSection {
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_ocr_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OcrSection {
    fn default() -> Self {
        Self {
            language: default_language(),
            timeout_secs: default_ocr_timeout_secs(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub scan: ScanSection,
    #[serde(default)]
    pub ocr: OcrSection,
}

impl Config {
    /// Load configuration from an explicit path, or from
    /// `{data_dir}/paperflow.toml` when present, or defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let candidate = match path {
            Some(p) => p.to_path_buf(),
            None => default_data_dir().join("paperflow.toml"),
        };

        if candidate.exists() {
            let raw = std::fs::read_to_string(&candidate)?;
            toml::from_str(&raw).map_err(|e| Error::Config(e.to_string()))
        } else if path.is_some() {
            Err(Error::Config(format!(
                "config file not found: {}",
                candidate.display()
            )))
        } else {
            Ok(Self {
                data_dir: default_data_dir(),
                ..Default::default()
            })
        }
    }

    /// Write the current settings out as TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Directory scan output files are written under.
    pub fn working_dir(&self) -> PathBuf {
        self.data_dir.join("scans")
    }

    /// Path of the SQLite document store.
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("paperflow.db")
    }

    /// Capture options derived from the scan section.
    pub fn scan_options(&self) -> Result<ScanOptions> {
        let format = ImageFormat::from_str(&self.scan.format)
            .ok_or_else(|| Error::Config(format!("unknown image format: {}", self.scan.format)))?;
        let color_mode = ColorMode::from_str(&self.scan.color_mode).ok_or_else(|| {
            Error::Config(format!("unknown color mode: {}", self.scan.color_mode))
        })?;

        Ok(ScanOptions {
            resolution_dpi: self.scan.resolution_dpi,
            format,
            quality_percent: self.scan.quality_percent,
            page_size: self.scan.page_size.clone(),
            color_mode,
        })
    }

    /// Scan service settings derived from the scan section.
    pub fn scan_service_config(&self) -> ScanServiceConfig {
        ScanServiceConfig {
            working_dir: self.working_dir(),
            capture_timeout: Duration::from_secs(self.scan.capture_timeout_secs),
            discovery_timeout: Duration::from_secs(self.scan.discovery_timeout_secs),
            batch_delay: Duration::from_millis(self.scan.batch_delay_ms),
        }
    }

    /// OCR options derived from the ocr section.
    pub fn ocr_options(&self) -> OcrOptions {
        OcrOptions {
            language: self.ocr.language.clone(),
        }
    }

    /// OCR invocation timeout.
    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse_from_empty_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.scan.resolution_dpi, 300);
        assert_eq!(config.scan.format, "jpeg");
        assert_eq!(config.ocr.language, "eng");
    }

    #[test]
    fn test_partial_override() {
        let config: Config = toml::from_str(
            "[scan]\nresolution_dpi = 600\n\n[ocr]\nlanguage = \"deu\"\n",
        )
        .unwrap();
        assert_eq!(config.scan.resolution_dpi, 600);
        assert_eq!(config.scan.quality_percent, 90);
        assert_eq!(config.ocr.language, "deu");
    }

    #[test]
    fn test_scan_options_reject_unknown_format() {
        let mut config = Config::default();
        config.scan = ScanSection::default();
        config.scan.format = "webp".to_string();
        assert!(config.scan_options().is_err());
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paperflow.toml");

        let mut config = Config::default();
        config.data_dir = dir.path().to_path_buf();
        config.scan.resolution_dpi = 150;
        config.save(&path).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.scan.resolution_dpi, 150);
    }

    #[test]
    fn test_missing_explicit_path_errors() {
        assert!(Config::load(Some(Path::new("/nonexistent/paperflow.toml"))).is_err());
    }
}
