//! Authorization collaborator seam.
//!
//! The surrounding record-management system owns users, roles, and
//! permissions; the pipeline only asks it a yes/no question before any
//! external process is spawned.

use std::fmt;

/// Capabilities the pipeline checks before running an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Discover devices and capture scans.
    DocumentScan,
    /// Build and persist archive records.
    DocumentUpload,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DocumentScan => "document.scan",
            Self::DocumentUpload => "document.upload",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External authorization service.
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, actor: &str, capability: Capability) -> bool;
}

/// Grants every capability to every actor.
///
/// Used by the CLI, where the operating-system user already owns the data
/// directory, and by tests.
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn is_authorized(&self, _actor: &str, _capability: Capability) -> bool {
        true
    }
}

/// Denies every capability. Test double for the denial path.
pub struct DenyAll;

impl Authorizer for DenyAll {
    fn is_authorized(&self, _actor: &str, _capability: Capability) -> bool {
        false
    }
}
