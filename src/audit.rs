//! Audit sink collaborator seam.
//!
//! Every completed scan, bulk scan, and record build emits one event,
//! whether it succeeded or failed. Retention and querying of the trail
//! belong to the surrounding system.

use chrono::{DateTime, Utc};

/// One completed pipeline operation.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Actor that requested the operation.
    pub actor: String,
    /// Operation name: "scan", "scan_batch", "archive_record", "archive_batch".
    pub operation: String,
    /// Device id or archive category the operation targeted.
    pub target: String,
    /// Items that completed successfully.
    pub succeeded: usize,
    /// Items that failed.
    pub failed: usize,
    /// When the operation completed.
    pub at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(actor: &str, operation: &str, target: &str, succeeded: usize, failed: usize) -> Self {
        Self {
            actor: actor.to_string(),
            operation: operation.to_string(),
            target: target.to_string(),
            succeeded,
            failed,
            at: Utc::now(),
        }
    }
}

/// External audit sink.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// Emits audit events through the tracing subscriber.
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&self, event: AuditEvent) {
        tracing::info!(
            actor = %event.actor,
            operation = %event.operation,
            target = %event.target,
            succeeded = event.succeeded,
            failed = event.failed,
            "audit"
        );
    }
}

/// Collects audit events in memory for inspection in tests.
#[derive(Default)]
pub struct MemoryAuditSink {
    events: std::sync::Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of recorded events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        self.events.lock().unwrap().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records() {
        let sink = MemoryAuditSink::new();
        sink.record(AuditEvent::new("alice", "scan", "dev0", 1, 0));
        sink.record(AuditEvent::new("alice", "scan_batch", "dev0", 3, 2));

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].succeeded, 3);
        assert_eq!(events[1].failed, 2);
    }
}
