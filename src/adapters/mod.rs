//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `memory` - In-memory repository and audit log (tests, local runs)
//! - `postgres` - PostgreSQL repository and audit log
//! - `scheduling` - Background expiration worker
//! - `clock` - System and fixed clocks

mod clock;
pub mod memory;
pub mod postgres;
pub mod scheduling;

pub use clock::{FixedClock, SystemClock};
pub use memory::{InMemoryAuditLog, InMemoryQuoteRepository};
pub use postgres::{PostgresAuditLog, PostgresQuoteRepository};
pub use scheduling::{ExpirationWorker, ExpirationWorkerConfig};
