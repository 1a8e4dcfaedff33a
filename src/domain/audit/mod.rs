//! Audit trail domain types.

mod entry;

pub use entry::{AuditEntry, AuditOutcome, AuditSource, DecisionSnapshot};
