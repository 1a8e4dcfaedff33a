//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `QuoteRepository` - Quote persistence with conditional status updates
//! - `AuditLog` - Best-effort append-only audit trail
//! - `Clock` - Source of the current time

mod audit_log;
mod clock;
mod quote_repository;

pub use audit_log::{AuditLog, AuditLogError};
pub use clock::Clock;
pub use quote_repository::QuoteRepository;
pub(crate) use quote_repository::status_conflict;
