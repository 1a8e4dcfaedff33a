//! Mapping from a validation verdict to a lifecycle transition and the
//! customer-facing message that goes with it.

use super::validator::{TargetStatus, ValidationResult};
use crate::domain::foundation::{QuoteStatus, RiskScore, Timestamp};
use crate::domain::quote::{QuoteTransition, DEFAULT_REJECTION_REASON};

/// Separator between validator reasons in rejection text.
pub const REASON_SEPARATOR: &str = "; ";

pub const APPROVED_MESSAGE: &str =
    "Quote approved! Please upload your shipping documents to activate coverage.";

pub const UNDER_REVIEW_MESSAGE: &str =
    "Your quote is under review. Our underwriting team will contact you within 24 hours.";

pub const PROCESSING_MESSAGE: &str = "Your quote is being processed.";

/// Chooses the transition for a validated quote.
///
/// An invalid verdict always rejects. A valid verdict approves or sends the
/// quote to review according to its target. Any other combination (a valid
/// verdict targeting rejection) rejects as well, so a malformed verdict can
/// never approve a quote.
pub fn decide(validation: &ValidationResult, risk_score: RiskScore, now: Timestamp) -> QuoteTransition {
    match (validation.is_valid, validation.target_status) {
        (false, _) => QuoteTransition::rejected(risk_score, rejection_text(&validation.reasons), now),
        (true, TargetStatus::Approved) => QuoteTransition::approved(risk_score, now),
        (true, TargetStatus::UnderReview) => QuoteTransition::under_review(risk_score, now),
        (true, TargetStatus::Rejected) => {
            QuoteTransition::rejected(risk_score, rejection_text(&validation.reasons), now)
        }
    }
}

/// Joins validator reasons into a single rejection reason.
pub fn rejection_text(reasons: &[String]) -> String {
    let joined = reasons
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .collect::<Vec<_>>()
        .join(REASON_SEPARATOR);
    if joined.is_empty() {
        DEFAULT_REJECTION_REASON.to_string()
    } else {
        joined
    }
}

/// Customer-facing text for the final status.
pub fn decision_message(status: QuoteStatus, reasons: &[String]) -> String {
    match status {
        QuoteStatus::Approved => APPROVED_MESSAGE.to_string(),
        QuoteStatus::UnderReview => UNDER_REVIEW_MESSAGE.to_string(),
        QuoteStatus::Rejected => format!("Quote rejected: {}", rejection_text(reasons)),
        _ => PROCESSING_MESSAGE.to_string(),
    }
}
