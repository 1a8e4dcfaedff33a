//! Audit log port - append-only record of transition attempts.
//!
//! Writes are best-effort from the caller's point of view: a failure here
//! never undoes a committed status change. The port still reports failures
//! so callers decide, visibly, what to do with them.

use async_trait::async_trait;

use crate::domain::audit::AuditEntry;
use crate::domain::foundation::AuditEntryId;

/// Errors that can occur while writing the audit trail.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuditLogError {
    #[error("Audit log unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to serialize audit entry {id}: {reason}")]
    SerializationFailed { id: AuditEntryId, reason: String },

    #[error("Audit entry already recorded: {0}")]
    Duplicate(AuditEntryId),
}

/// Port for appending audit entries.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one entry.
    async fn record(&self, entry: &AuditEntry) -> Result<(), AuditLogError>;
}
