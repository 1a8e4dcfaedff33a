//! Audit trail entry for one attempted status transition.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AuditEntryId, QuoteId, QuoteStatus, Timestamp};
use crate::domain::underwriting::{RiskAssessment, ValidationResult};

/// Which part of the engine attempted the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSource {
    Decision,
    Expiration,
}

/// Whether the attempted transition was persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Committed,
    /// Another writer changed the quote first; nothing was written.
    Conflict,
    /// The write failed for another reason; nothing was written.
    Failed,
}

/// Everything the engine knew when it made the decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSnapshot {
    pub validation: ValidationResult,
    pub risk: RiskAssessment,
}

/// Append-only record of a transition attempt. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    id: AuditEntryId,
    quote_id: QuoteId,
    source: AuditSource,
    outcome: AuditOutcome,
    prior_status: QuoteStatus,
    new_status: QuoteStatus,
    snapshot: Option<DecisionSnapshot>,
    created_at: Timestamp,
}

impl AuditEntry {
    /// Entry for a decision made by the orchestrator.
    pub fn decision(
        quote_id: QuoteId,
        prior_status: QuoteStatus,
        new_status: QuoteStatus,
        snapshot: DecisionSnapshot,
        outcome: AuditOutcome,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: AuditEntryId::new(),
            quote_id,
            source: AuditSource::Decision,
            outcome,
            prior_status,
            new_status,
            snapshot: Some(snapshot),
            created_at,
        }
    }

    /// Entry for a quote lapsed by the expiration sweep.
    pub fn expiration(quote_id: QuoteId, prior_status: QuoteStatus, created_at: Timestamp) -> Self {
        Self {
            id: AuditEntryId::new(),
            quote_id,
            source: AuditSource::Expiration,
            outcome: AuditOutcome::Committed,
            prior_status,
            new_status: QuoteStatus::Expired,
            snapshot: None,
            created_at,
        }
    }

    pub fn id(&self) -> &AuditEntryId {
        &self.id
    }

    pub fn quote_id(&self) -> &QuoteId {
        &self.quote_id
    }

    pub fn source(&self) -> AuditSource {
        self.source
    }

    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }

    pub fn prior_status(&self) -> QuoteStatus {
        self.prior_status
    }

    pub fn new_status(&self) -> QuoteStatus {
        self.new_status
    }

    pub fn snapshot(&self) -> Option<&DecisionSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }
}
