//! In-memory adapters for tests and local development.

mod audit_log;
mod quote_repository;

pub use audit_log::InMemoryAuditLog;
pub use quote_repository::InMemoryQuoteRepository;
