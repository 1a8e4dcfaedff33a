//! Scheduled background services.

mod expiration_worker;

pub use expiration_worker::{ExpirationWorker, ExpirationWorkerConfig};
