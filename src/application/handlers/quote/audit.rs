//! Best-effort audit recording shared by the quote handlers.

use crate::domain::audit::AuditEntry;
use crate::ports::AuditLog;

/// Appends `entry` to the audit log and reports whether it was stored.
///
/// A failed write is logged and discarded. Callers only reach this point
/// once the status change is settled, and the audit trail must never undo
/// or block it.
pub(crate) async fn record_best_effort(audit_log: &dyn AuditLog, entry: &AuditEntry) -> bool {
    match audit_log.record(entry).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(
                quote_id = %entry.quote_id(),
                audit_entry_id = %entry.id(),
                prior_status = %entry.prior_status(),
                new_status = %entry.new_status(),
                error = %e,
                "Failed to write audit entry; status change stands"
            );
            false
        }
    }
}
