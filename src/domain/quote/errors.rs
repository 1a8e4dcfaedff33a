//! Quote-specific error types surfaced by the decision engine.

use crate::domain::foundation::{DomainError, ErrorCode, QuoteId, QuoteStatus};

/// Errors returned by the decision and expiration handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    /// No quote with this id exists.
    #[error("Quote not found: {0}")]
    NotFound(QuoteId),

    /// Another writer changed the quote between read and update.
    ///
    /// Retry the whole cycle (re-fetch, re-validate, re-update); re-applying
    /// the stale decision is never correct.
    #[error("Quote {quote_id} was modified concurrently (expected status {expected})")]
    Conflict {
        quote_id: QuoteId,
        expected: QuoteStatus,
    },

    /// The quote is in a status the engine does not transition from.
    #[error("Quote {quote_id} cannot be processed in status {status}")]
    NotProcessable {
        quote_id: QuoteId,
        status: QuoteStatus,
    },

    /// The repository refused the transition itself.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Any other storage failure.
    #[error("Repository error: {0}")]
    Repository(String),
}

impl QuoteError {
    /// Translates a repository error for an operation on `quote_id`.
    pub fn from_repository(quote_id: QuoteId, expected: QuoteStatus, err: DomainError) -> Self {
        match err.code {
            ErrorCode::QuoteNotFound => QuoteError::NotFound(quote_id),
            ErrorCode::ConcurrentModification => QuoteError::Conflict { quote_id, expected },
            ErrorCode::InvalidStateTransition => QuoteError::InvalidState(err.message),
            _ => QuoteError::Repository(err.to_string()),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            QuoteError::NotFound(_) => ErrorCode::QuoteNotFound,
            QuoteError::Conflict { .. } => ErrorCode::ConcurrentModification,
            QuoteError::NotProcessable { .. } => ErrorCode::QuoteNotProcessable,
            QuoteError::InvalidState(_) => ErrorCode::InvalidStateTransition,
            QuoteError::Repository(_) => ErrorCode::DatabaseError,
        }
    }

    /// True if re-running the whole decision cycle may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QuoteError::Conflict { .. })
    }
}

impl From<DomainError> for QuoteError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::InvalidStateTransition => QuoteError::InvalidState(err.message),
            _ => QuoteError::Repository(err.to_string()),
        }
    }
}
