//! Quote aggregate entity.
//!
//! A quote is a customer's cargo-insurance request awaiting a coverage
//! decision. Shipment details are fixed once the quote exists; only the
//! lifecycle attributes change, and only through [`QuoteTransition`].

use serde::{Deserialize, Serialize};

use super::values::Shipment;
use crate::domain::foundation::{
    DomainError, ErrorCode, QuoteId, QuoteStatus, RiskScore, StateMachine, Timestamp,
};

/// Quote aggregate.
///
/// # Invariants
///
/// - `rejection_reason` is `Some` iff `status == Rejected`
/// - `approved_at` is `Some` iff `status == Approved`
/// - `quote_expires_at` is `Some` once the quote has been submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    id: QuoteId,
    shipment: Shipment,
    status: QuoteStatus,
    risk_score: Option<RiskScore>,
    rejection_reason: Option<String>,
    approved_at: Option<Timestamp>,
    quote_expires_at: Option<Timestamp>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Quote {
    /// Create a new draft quote.
    pub fn new(id: QuoteId, shipment: Shipment, now: Timestamp) -> Self {
        Self {
            id,
            shipment,
            status: QuoteStatus::Draft,
            risk_score: None,
            rejection_reason: None,
            approved_at: None,
            quote_expires_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitute a quote from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: QuoteId,
        shipment: Shipment,
        status: QuoteStatus,
        risk_score: Option<RiskScore>,
        rejection_reason: Option<String>,
        approved_at: Option<Timestamp>,
        quote_expires_at: Option<Timestamp>,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            shipment,
            status,
            risk_score,
            rejection_reason,
            approved_at,
            quote_expires_at,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &QuoteId {
        &self.id
    }

    pub fn shipment(&self) -> &Shipment {
        &self.shipment
    }

    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    /// Score from the most recent evaluation; `None` until first processed.
    pub fn risk_score(&self) -> Option<RiskScore> {
        self.risk_score
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn approved_at(&self) -> Option<&Timestamp> {
        self.approved_at.as_ref()
    }

    pub fn quote_expires_at(&self) -> Option<&Timestamp> {
        self.quote_expires_at.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    /// Returns true if the quote is still awaiting a decision and its
    /// decision window closed strictly before `now`.
    pub fn is_expired_at(&self, now: &Timestamp) -> bool {
        self.status.is_expirable()
            && self
                .quote_expires_at
                .map_or(false, |expires_at| expires_at.is_before(now))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Submit a draft for a decision, opening a window that closes at `expires_at`.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the quote is not a draft
    /// - `ValidationFailed` if `expires_at` is not after `now`
    pub fn submit(&mut self, expires_at: Timestamp, now: Timestamp) -> Result<(), DomainError> {
        self.ensure_transition(QuoteStatus::Submitted)?;
        if !expires_at.is_after(&now) {
            return Err(DomainError::validation(
                "quote_expires_at",
                "Quote expiry must be in the future",
            ));
        }

        self.status = QuoteStatus::Submitted;
        self.quote_expires_at = Some(expires_at);
        self.updated_at = now;
        Ok(())
    }

    /// Apply a lifecycle transition.
    ///
    /// Only the fields carried by the transition change. `approved_at` and
    /// `rejection_reason` are always overwritten so the invariants hold even
    /// when a quote leaves review.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if the state machine forbids the move
    pub fn apply_transition(&mut self, transition: &QuoteTransition) -> Result<(), DomainError> {
        self.ensure_transition(transition.status)?;

        self.status = transition.status;
        if let Some(score) = transition.risk_score {
            self.risk_score = Some(score);
        }
        self.approved_at = transition.approved_at;
        self.rejection_reason = transition.rejection_reason.clone();
        self.updated_at = transition.updated_at;
        Ok(())
    }

    fn ensure_transition(&self, target: QuoteStatus) -> Result<(), DomainError> {
        self.status.transition_to(target).map(|_| ()).map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStateTransition,
                format!("Quote {} cannot move from {} to {}", self.id, self.status, target),
            )
        })
    }
}

/// The set of lifecycle fields written by a single status change.
///
/// Constructed only through the named constructors, which keep
/// `approved_at` and `rejection_reason` consistent with `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTransition {
    status: QuoteStatus,
    risk_score: Option<RiskScore>,
    approved_at: Option<Timestamp>,
    rejection_reason: Option<String>,
    updated_at: Timestamp,
}

impl QuoteTransition {
    /// Approve the quote, stamping `approved_at` with `now`.
    pub fn approved(risk_score: RiskScore, now: Timestamp) -> Self {
        Self {
            status: QuoteStatus::Approved,
            risk_score: Some(risk_score),
            approved_at: Some(now),
            rejection_reason: None,
            updated_at: now,
        }
    }

    /// Send the quote to manual underwriting review.
    pub fn under_review(risk_score: RiskScore, now: Timestamp) -> Self {
        Self {
            status: QuoteStatus::UnderReview,
            risk_score: Some(risk_score),
            approved_at: None,
            rejection_reason: None,
            updated_at: now,
        }
    }

    /// Reject the quote. A blank reason is replaced with a generic one.
    pub fn rejected(risk_score: RiskScore, reason: impl Into<String>, now: Timestamp) -> Self {
        let reason = reason.into();
        let reason = if reason.trim().is_empty() {
            DEFAULT_REJECTION_REASON.to_string()
        } else {
            reason
        };
        Self {
            status: QuoteStatus::Rejected,
            risk_score: Some(risk_score),
            approved_at: None,
            rejection_reason: Some(reason),
            updated_at: now,
        }
    }

    /// Lapse the quote. The last risk score is left untouched.
    pub fn expired(now: Timestamp) -> Self {
        Self {
            status: QuoteStatus::Expired,
            risk_score: None,
            approved_at: None,
            rejection_reason: None,
            updated_at: now,
        }
    }

    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    /// `None` means the stored score is kept.
    pub fn risk_score(&self) -> Option<RiskScore> {
        self.risk_score
    }

    pub fn approved_at(&self) -> Option<&Timestamp> {
        self.approved_at.as_ref()
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }
}

/// Used when a rejection carries no validator reasons.
pub const DEFAULT_REJECTION_REASON: &str = "Quote did not meet underwriting requirements";
