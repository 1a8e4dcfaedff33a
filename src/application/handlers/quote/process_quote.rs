//! ProcessQuoteHandler - decides the next status of a submitted quote.
//!
//! 1. Load the quote (must be `submitted` or `under_review`)
//! 2. Validate and score it
//! 3. Map the verdict to a transition
//! 4. Persist with a conditional update on the status read in step 1
//! 5. Record an audit entry (best-effort)
//! 6. Return the decision with a customer-facing message

use std::sync::Arc;

use crate::domain::audit::{AuditEntry, AuditOutcome, DecisionSnapshot};
use crate::domain::foundation::{QuoteId, QuoteStatus, RiskScore};
use crate::domain::quote::{Quote, QuoteError};
use crate::domain::underwriting::{
    decide, decision_message, RiskAssessment, RiskScorer, ValidationResult, Validator,
};
use crate::ports::{AuditLog, Clock, QuoteRepository};

use super::audit::record_best_effort;

/// Command to run the decision cycle for one quote.
#[derive(Debug, Clone)]
pub struct ProcessQuoteCommand {
    pub quote_id: QuoteId,
}

/// Outcome of a committed decision.
#[derive(Debug, Clone)]
pub struct DecisionResult {
    /// The quote as stored after the update.
    pub quote: Quote,
    pub validation: ValidationResult,
    pub risk: RiskAssessment,
    /// True iff the quote was approved without manual review.
    pub auto_approved: bool,
    /// True iff the document-submission flow should be unlocked.
    pub requires_documents: bool,
    pub message: String,
    /// False when the audit write failed; the decision still stands.
    pub audit_recorded: bool,
}

impl DecisionResult {
    pub fn status(&self) -> QuoteStatus {
        self.quote.status()
    }

    pub fn risk_score(&self) -> RiskScore {
        self.risk.score
    }
}

/// Decision orchestrator.
pub struct ProcessQuoteHandler {
    repository: Arc<dyn QuoteRepository>,
    audit_log: Arc<dyn AuditLog>,
    clock: Arc<dyn Clock>,
    validator: Arc<Validator>,
    scorer: Arc<RiskScorer>,
}

impl ProcessQuoteHandler {
    pub fn new(
        repository: Arc<dyn QuoteRepository>,
        audit_log: Arc<dyn AuditLog>,
        clock: Arc<dyn Clock>,
        validator: Arc<Validator>,
        scorer: Arc<RiskScorer>,
    ) -> Self {
        Self {
            repository,
            audit_log,
            clock,
            validator,
            scorer,
        }
    }

    /// Run one decision cycle.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the quote doesn't exist
    /// - `NotProcessable` if the quote is a draft or already decided
    /// - `Conflict` if another writer changed the quote first; retry the
    ///   whole cycle
    /// - `Repository` / `InvalidState` on storage failures
    pub async fn handle(&self, cmd: ProcessQuoteCommand) -> Result<DecisionResult, QuoteError> {
        let quote_id = cmd.quote_id;

        // 1. Load
        let quote = self
            .repository
            .find_by_id(&quote_id)
            .await?
            .ok_or(QuoteError::NotFound(quote_id))?;

        let prior_status = quote.status();
        if !prior_status.is_awaiting_decision() {
            tracing::debug!(
                quote_id = %quote_id,
                status = %prior_status,
                "Quote is not awaiting a decision"
            );
            return Err(QuoteError::NotProcessable {
                quote_id,
                status: prior_status,
            });
        }

        // 2. Validate and score
        let validation = self.validator.validate(&quote);
        let risk = self.scorer.assess(&quote);

        // 3. Decide
        let now = self.clock.now();
        let transition = decide(&validation, risk.score, now);
        let snapshot = DecisionSnapshot {
            validation: validation.clone(),
            risk,
        };

        // 4. Persist, only if nobody moved the quote since step 1
        let updated = match self
            .repository
            .update_status(&quote_id, &transition, Some(prior_status))
            .await
        {
            Ok(updated) => updated,
            Err(err) => {
                let error = QuoteError::from_repository(quote_id, prior_status, err);
                let outcome = if error.is_retryable() {
                    tracing::info!(
                        quote_id = %quote_id,
                        expected_status = %prior_status,
                        "Lost race while deciding quote"
                    );
                    AuditOutcome::Conflict
                } else {
                    tracing::error!(quote_id = %quote_id, error = %error, "Failed to store decision");
                    AuditOutcome::Failed
                };
                let entry = AuditEntry::decision(
                    quote_id,
                    prior_status,
                    transition.status(),
                    snapshot,
                    outcome,
                    now,
                );
                record_best_effort(self.audit_log.as_ref(), &entry).await;
                return Err(error);
            }
        };

        // 5. Audit; the result is inspected and deliberately not propagated
        let entry = AuditEntry::decision(
            quote_id,
            prior_status,
            updated.status(),
            snapshot,
            AuditOutcome::Committed,
            now,
        );
        let audit_recorded = record_best_effort(self.audit_log.as_ref(), &entry).await;

        // 6. Result
        let status = updated.status();
        let approved = status == QuoteStatus::Approved;
        let message = decision_message(status, &validation.reasons);

        tracing::info!(
            quote_id = %quote_id,
            prior_status = %prior_status,
            status = %status,
            risk_score = %risk.score,
            reasons = validation.reasons.len(),
            "Quote decided"
        );

        Ok(DecisionResult {
            quote: updated,
            validation,
            risk,
            auto_approved: approved,
            requires_documents: approved,
            message,
            audit_recorded,
        })
    }
}
