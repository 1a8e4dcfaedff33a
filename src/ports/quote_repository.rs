//! Quote repository port.
//!
//! Defines the contract for persisting and retrieving Quote aggregates.
//! The repository is the single source of truth for concurrent access, so
//! status changes go through a conditional update rather than a blind write.

use crate::domain::foundation::{DomainError, ErrorCode, QuoteId, QuoteStatus, Timestamp};
use crate::domain::quote::{Quote, QuoteTransition};
use async_trait::async_trait;

/// Repository port for Quote aggregate persistence.
///
/// Implementations must make `update_status` atomic: the status check and
/// the write happen as one operation, so two concurrent writers that read
/// the same prior status cannot both succeed.
#[async_trait]
pub trait QuoteRepository: Send + Sync {
    /// Save a new quote.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` if a quote with the same id exists
    /// - `DatabaseError` on persistence failure
    async fn save(&self, quote: &Quote) -> Result<(), DomainError>;

    /// Find a quote by its ID.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &QuoteId) -> Result<Option<Quote>, DomainError>;

    /// Apply a lifecycle transition and return the updated quote.
    ///
    /// Writes only the fields carried by `transition`. When
    /// `expected_status` is given, the write happens only if the stored
    /// status still equals it.
    ///
    /// # Errors
    ///
    /// - `QuoteNotFound` if the quote doesn't exist
    /// - `ConcurrentModification` if the stored status differs from
    ///   `expected_status` (details carry `expected_status` and `actual_status`)
    /// - `InvalidStateTransition` if the stored status cannot move to the
    ///   transition's status
    /// - `DatabaseError` on persistence failure
    async fn update_status(
        &self,
        id: &QuoteId,
        transition: &QuoteTransition,
        expected_status: Option<QuoteStatus>,
    ) -> Result<Quote, DomainError>;

    /// Find submitted quotes whose decision window closed before `cutoff`.
    ///
    /// Quotes in any other status are never returned, whatever their expiry.
    async fn list_submitted_expired_before(
        &self,
        cutoff: &Timestamp,
    ) -> Result<Vec<Quote>, DomainError>;
}

/// The `ConcurrentModification` error adapters return when the stored
/// status no longer matches the expected one.
pub(crate) fn status_conflict(id: &QuoteId, expected: QuoteStatus, actual: QuoteStatus) -> DomainError {
    DomainError::new(
        ErrorCode::ConcurrentModification,
        format!("Quote {} changed: expected {}, found {}", id, expected, actual),
    )
    .with_detail("expected_status", expected.to_string())
    .with_detail("actual_status", actual.to_string())
}
