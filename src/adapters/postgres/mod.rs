//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresQuoteRepository` - Quote persistence with row-locked status updates
//! - `PostgresAuditLog` - Append-only audit trail

mod audit_log;
mod quote_repository;

pub use audit_log::PostgresAuditLog;
pub use quote_repository::PostgresQuoteRepository;

/// Embedded schema migrations (`migrations/` at the crate root).
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
