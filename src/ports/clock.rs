//! Clock port - source of "now" for the decision engine.

use crate::domain::foundation::Timestamp;

/// Supplies the current time.
///
/// Injected so handlers stay deterministic under test.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
