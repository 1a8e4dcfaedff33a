//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the quote decision domain.

mod errors;
mod ids;
mod quote_status;
mod risk_score;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{AuditEntryId, QuoteId};
pub use quote_status::QuoteStatus;
pub use risk_score::RiskScore;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
