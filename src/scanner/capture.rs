//! Capture command construction for the scanner backends.

use std::path::Path;

use crate::models::{ImageFormat, ScanOptions, ScannerBackend};

/// Page dimensions in millimeters for sizes scanimage understands.
fn page_dimensions_mm(page_size: &str) -> Option<(f64, f64)> {
    match page_size.to_uppercase().as_str() {
        "A4" => Some((210.0, 297.0)),
        "A5" => Some((148.0, 210.0)),
        "LETTER" => Some((215.9, 279.4)),
        "LEGAL" => Some((215.9, 355.6)),
        _ => None,
    }
}

/// Build the capture invocation for a device and output path.
pub fn capture_command(
    backend: ScannerBackend,
    device_id: &str,
    options: &ScanOptions,
    output_path: &Path,
) -> (String, Vec<String>) {
    match backend {
        ScannerBackend::Sane => sane_command(device_id, options, output_path),
        ScannerBackend::Wia => wia_command(device_id, options, output_path),
    }
}

fn sane_command(device_id: &str, options: &ScanOptions, output_path: &Path) -> (String, Vec<String>) {
    let mut args = vec![
        "-d".to_string(),
        device_id.to_string(),
        "--resolution".to_string(),
        options.resolution_dpi.to_string(),
        "--mode".to_string(),
        options.color_mode.sane_mode().to_string(),
        format!("--format={}", options.format.as_str()),
    ];

    if let Some((width, height)) = page_dimensions_mm(&options.page_size) {
        args.push("-x".to_string());
        args.push(width.to_string());
        args.push("-y".to_string());
        args.push(height.to_string());
    }

    args.push("-o".to_string());
    args.push(output_path.display().to_string());

    ("scanimage".to_string(), args)
}

fn wia_command(device_id: &str, options: &ScanOptions, output_path: &Path) -> (String, Vec<String>) {
    // WIA property 6147/6148 set horizontal/vertical DPI; 4103 the format.
    let format_clsid = match options.format {
        ImageFormat::Jpeg => "{B96B3CAE-0728-11D3-9D7B-0000F81EF32E}",
        ImageFormat::Png => "{B96B3CAF-0728-11D3-9D7B-0000F81EF32E}",
        ImageFormat::Tiff => "{B96B3CB1-0728-11D3-9D7B-0000F81EF32E}",
    };

    let script = format!(
        "$info = (New-Object -ComObject WIA.DeviceManager).DeviceInfos | \
         Where-Object {{ $_.DeviceID -eq '{id}' }} | Select-Object -First 1; \
         if (-not $info) {{ exit 2 }}; \
         $device = $info.Connect(); \
         $item = $device.Items.Item(1); \
         $item.Properties('6147').Value = {dpi}; \
         $item.Properties('6148').Value = {dpi}; \
         $image = $item.Transfer('{clsid}'); \
         $image.SaveFile('{path}')",
        id = device_id,
        dpi = options.resolution_dpi,
        clsid = format_clsid,
        path = output_path.display(),
    );

    (
        "powershell".to_string(),
        vec!["-NoProfile".to_string(), "-Command".to_string(), script],
    )
}

/// Whether stderr carries only recognized warning lines.
///
/// scanimage emits rounding notices ("rounded value of ...") and explicit
/// warnings on stderr during successful captures; those must not be read
/// as failures.
pub fn stderr_is_warning_only(stderr: &str) -> bool {
    stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .all(|line| {
            let lower = line.to_lowercase();
            lower.contains("warning") || lower.contains("rounded value")
        })
}
