//! Scanner backends: device discovery and capture command construction.

mod capture;
mod discovery;

pub use capture::{capture_command, stderr_is_warning_only};
pub use discovery::DriverRegistry;
