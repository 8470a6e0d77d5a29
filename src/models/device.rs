//! Scanner device descriptors.

use serde::{Deserialize, Serialize};

/// Scanner access protocol family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScannerBackend {
    /// POSIX scanner-access protocol (SANE, via scanimage).
    Sane,
    /// Windows image acquisition (WIA, via powershell).
    Wia,
}

impl ScannerBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sane => "sane",
            Self::Wia => "wia",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "sane" => Some(Self::Sane),
            "wia" => Some(Self::Wia),
            _ => None,
        }
    }

    /// Infer the backend family from a backend-native device id.
    ///
    /// WIA device ids are PnP paths (`USB\VID_04B8&...` or `\\?\usb#...`);
    /// SANE ids are `backend:address` strings (`epson2:libusb:001:004`).
    pub fn for_device(device_id: &str) -> Self {
        if device_id.contains('\\') {
            Self::Wia
        } else {
            Self::Sane
        }
    }
}

/// A scanner reported by one backend probe.
///
/// Ephemeral: rebuilt on every discovery call, never persisted. The `id`
/// is the backend-native string and must be passed back verbatim when
/// requesting a capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub id: String,
    pub display_name: String,
    pub backend: ScannerBackend,
    pub available: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_inference() {
        assert_eq!(
            ScannerBackend::for_device("epson2:libusb:001:004"),
            ScannerBackend::Sane
        );
        assert_eq!(
            ScannerBackend::for_device("USB\\VID_04B8&PID_013C\\5&2D0A5C2"),
            ScannerBackend::Wia
        );
        assert_eq!(
            ScannerBackend::for_device("\\\\?\\usb#vid_04b8#pid_013c"),
            ScannerBackend::Wia
        );
    }

    #[test]
    fn test_backend_roundtrip() {
        assert_eq!(ScannerBackend::from_str("sane"), Some(ScannerBackend::Sane));
        assert_eq!(ScannerBackend::from_str("wia"), Some(ScannerBackend::Wia));
        assert_eq!(ScannerBackend::from_str("twain"), None);
    }
}
