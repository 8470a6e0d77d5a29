//! Scanner backend probing and device enumeration.
//!
//! Two backend families are probed: SANE (`scanimage -L`) on POSIX hosts
//! and WIA (a powershell device query) on Windows hosts. A backend whose
//! tool is absent or unresponsive contributes zero devices; discovery only
//! fails when every probe fails.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::{Error, Result};
use crate::exec::CommandRunner;
use crate::models::{DeviceDescriptor, ScannerBackend};

/// `device 'epson2:libusb:001:004' is a Epson GT-X770 flatbed scanner`
static SANE_DEVICE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^device\s+`?'?([^']+)'\s+is\s+an?\s+(.+)$").unwrap());

/// Powershell query emitting one `DeviceID|Name|Status` line per imaging device.
const WIA_QUERY: &str = "Get-CimInstance Win32_PnPEntity -Filter \"PNPClass='Image'\" | \
     ForEach-Object { '{0}|{1}|{2}' -f $_.DeviceID, $_.Name, $_.Status }";

/// Enumerates scanner devices across backends.
pub struct DriverRegistry {
    probe_timeout: Duration,
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(10),
        }
    }
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Probe all backends and return the normalized device list.
    ///
    /// Device ids are backend-native strings, passed back verbatim at
    /// capture time. Devices reported but not available are excluded.
    pub async fn discover(&self, runner: &dyn CommandRunner) -> Result<Vec<DeviceDescriptor>> {
        let mut devices = Vec::new();
        let mut probes_failed = 0;

        match self.probe_sane(runner).await {
            Ok(mut found) => devices.append(&mut found),
            Err(e) => {
                tracing::debug!("SANE probe failed: {}", e);
                probes_failed += 1;
            }
        }

        match self.probe_wia(runner).await {
            Ok(mut found) => devices.append(&mut found),
            Err(e) => {
                tracing::debug!("WIA probe failed: {}", e);
                probes_failed += 1;
            }
        }

        if probes_failed == 2 {
            return Err(Error::DeviceNotFound(
                "no scanner backend responded on this host".to_string(),
            ));
        }

        Ok(devices)
    }

    async fn probe_sane(&self, runner: &dyn CommandRunner) -> Result<Vec<DeviceDescriptor>> {
        let args = vec!["-L".to_string()];
        let output = runner
            .run("scanimage", &args, self.probe_timeout)
            .await
            .map_err(|e| Error::DeviceNotFound(e.to_string()))?;

        let devices = parse_sane_listing(&output.stdout);

        // scanimage exits non-zero when no scanner is attached; that is a
        // recognized empty listing, not a probe failure.
        if !output.success() && devices.is_empty() && !recognized_empty_listing(&output) {
            return Err(Error::DeviceNotFound(format!(
                "scanimage exited with {:?}",
                output.exit_code
            )));
        }

        Ok(devices)
    }

    async fn probe_wia(&self, runner: &dyn CommandRunner) -> Result<Vec<DeviceDescriptor>> {
        let args = vec![
            "-NoProfile".to_string(),
            "-Command".to_string(),
            WIA_QUERY.to_string(),
        ];
        let output = runner
            .run("powershell", &args, self.probe_timeout)
            .await
            .map_err(|e| Error::DeviceNotFound(e.to_string()))?;

        if !output.success() {
            return Err(Error::DeviceNotFound(format!(
                "powershell exited with {:?}",
                output.exit_code
            )));
        }

        Ok(parse_wia_listing(&output.stdout))
    }
}

/// Parse `scanimage -L` output. SANE lists only devices that are present,
/// so everything parsed is available.
fn parse_sane_listing(stdout: &str) -> Vec<DeviceDescriptor> {
    let mut devices = Vec::new();
    for line in stdout.lines() {
        if let Some(caps) = SANE_DEVICE_LINE.captures(line.trim()) {
            devices.push(DeviceDescriptor {
                id: caps[1].to_string(),
                display_name: caps[2].trim().to_string(),
                backend: ScannerBackend::Sane,
                available: true,
            });
        }
    }
    devices
}

/// Parse `DeviceID|Name|Status` lines from the WIA query. Devices whose
/// status is not OK are dropped, not flagged.
fn parse_wia_listing(stdout: &str) -> Vec<DeviceDescriptor> {
    let mut devices = Vec::new();
    for line in stdout.lines() {
        let parts: Vec<&str> = line.trim().splitn(3, '|').collect();
        if parts.len() != 3 || parts[0].is_empty() {
            continue;
        }
        let available = parts[2].trim().eq_ignore_ascii_case("ok");
        if !available {
            continue;
        }
        devices.push(DeviceDescriptor {
            id: parts[0].trim().to_string(),
            display_name: parts[1].trim().to_string(),
            backend: ScannerBackend::Wia,
            available: true,
        });
    }
    devices
}

fn recognized_empty_listing(output: &crate::exec::CommandOutput) -> bool {
    let combined = format!("{}{}", output.stdout, output.stderr);
    combined.to_lowercase().contains("no scanners were identified")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::test_support::ScriptedRunner;
    use crate::exec::{CommandError, CommandOutput};

    #[test]
    fn test_parse_sane_listing() {
        let listing = "device `epson2:libusb:001:004' is a Epson GT-X770 flatbed scanner\n\
                       device `pixma:04A91234' is a Canon PIXMA MG5300 multi-function peripheral\n";
        let devices = parse_sane_listing(listing);
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].id, "epson2:libusb:001:004");
        assert_eq!(devices[0].display_name, "Epson GT-X770 flatbed scanner");
        assert_eq!(devices[0].backend, ScannerBackend::Sane);
        assert!(devices[0].available);
    }

    #[test]
    fn test_parse_wia_listing_drops_unavailable() {
        let listing = "USB\\VID_04B8&PID_013C\\5&2D0A5C2|EPSON Perfection V39|OK\n\
                       USB\\VID_04A9&PID_190D\\6&1A2B3C4|Canon LiDE 300|Error\n";
        let devices = parse_wia_listing(listing);
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].display_name, "EPSON Perfection V39");
        assert_eq!(devices[0].backend, ScannerBackend::Wia);
    }

    #[tokio::test]
    async fn test_one_backend_absent_still_discovers() {
        let runner = ScriptedRunner::new(|program, _| match program {
            "scanimage" => Ok(CommandOutput::ok(
                "device `epson2:libusb:001:004' is a Epson GT-X770 flatbed scanner\n",
            )),
            _ => Err(CommandError::NotFound(program.to_string())),
        });

        let devices = DriverRegistry::new().discover(&runner).await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].backend, ScannerBackend::Sane);
    }

    #[tokio::test]
    async fn test_all_backends_absent_fails() {
        let runner =
            ScriptedRunner::new(|program, _| Err(CommandError::NotFound(program.to_string())));

        let result = DriverRegistry::new().discover(&runner).await;
        assert!(matches!(result, Err(Error::DeviceNotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_listing_is_not_a_probe_failure() {
        let runner = ScriptedRunner::new(|program, _| match program {
            "scanimage" => Ok(CommandOutput {
                stdout: String::new(),
                stderr: "No scanners were identified.".to_string(),
                exit_code: Some(1),
            }),
            _ => Err(CommandError::NotFound(program.to_string())),
        });

        let devices = DriverRegistry::new().discover(&runner).await.unwrap();
        assert!(devices.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_names_kept_distinct_by_backend() {
        let runner = ScriptedRunner::new(|program, _| match program {
            "scanimage" => Ok(CommandOutput::ok(
                "device `epson2:libusb:001:004' is a Office Scanner\n",
            )),
            "powershell" => Ok(CommandOutput::ok("USB\\VID_1\\A|Office Scanner|OK\n")),
            _ => Err(CommandError::NotFound(program.to_string())),
        });

        let devices = DriverRegistry::new().discover(&runner).await.unwrap();
        assert_eq!(devices.len(), 2);
        assert_ne!(devices[0].backend, devices[1].backend);
    }
}
