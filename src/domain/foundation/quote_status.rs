//! QuoteStatus enum for tracking the lifecycle of a quote request.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::StateMachine;

/// Lifecycle status of a quote.
///
/// ```text
/// draft -> submitted
/// submitted -> approved | under_review | rejected | expired
/// under_review -> approved | rejected | under_review
/// ```
///
/// `approved`, `rejected` and `expired` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Expired,
}

impl QuoteStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [QuoteStatus; 6] = [
        QuoteStatus::Draft,
        QuoteStatus::Submitted,
        QuoteStatus::UnderReview,
        QuoteStatus::Approved,
        QuoteStatus::Rejected,
        QuoteStatus::Expired,
    ];

    /// Returns true if the decision engine may evaluate a quote in this status.
    pub fn is_awaiting_decision(&self) -> bool {
        matches!(self, QuoteStatus::Submitted | QuoteStatus::UnderReview)
    }

    /// Returns true if the quote can still lapse through the expiry sweep.
    pub fn is_expirable(&self) -> bool {
        matches!(self, QuoteStatus::Submitted)
    }
}

impl StateMachine for QuoteStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use QuoteStatus::*;
        matches!(
            (self, target),
            (Draft, Submitted)
                | (Submitted, Approved)
                | (Submitted, UnderReview)
                | (Submitted, Rejected)
                | (Submitted, Expired)
                | (UnderReview, Approved)
                | (UnderReview, Rejected)
                | (UnderReview, UnderReview)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use QuoteStatus::*;
        match self {
            Draft => vec![Submitted],
            Submitted => vec![Approved, UnderReview, Rejected, Expired],
            UnderReview => vec![Approved, Rejected, UnderReview],
            Approved | Rejected | Expired => vec![],
        }
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Submitted => "submitted",
            QuoteStatus::UnderReview => "under_review",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_draft() {
        assert_eq!(QuoteStatus::default(), QuoteStatus::Draft);
    }

    #[test]
    fn submitted_can_reach_every_decision() {
        for target in [
            QuoteStatus::Approved,
            QuoteStatus::UnderReview,
            QuoteStatus::Rejected,
            QuoteStatus::Expired,
        ] {
            assert!(QuoteStatus::Submitted.can_transition_to(&target));
        }
    }

    #[test]
    fn under_review_cannot_expire() {
        assert!(!QuoteStatus::UnderReview.can_transition_to(&QuoteStatus::Expired));
    }

    #[test]
    fn draft_cannot_skip_submission() {
        assert!(!QuoteStatus::Draft.can_transition_to(&QuoteStatus::Approved));
    }

    #[test]
    fn decided_statuses_are_terminal() {
        assert!(QuoteStatus::Approved.is_terminal());
        assert!(QuoteStatus::Rejected.is_terminal());
        assert!(QuoteStatus::Expired.is_terminal());
        assert!(!QuoteStatus::Submitted.is_terminal());
        assert!(!QuoteStatus::UnderReview.is_terminal());
    }

    #[test]
    fn can_transition_to_is_consistent_with_valid_transitions() {
        for from in QuoteStatus::ALL {
            for to in QuoteStatus::ALL {
                assert_eq!(
                    from.can_transition_to(&to),
                    from.valid_transitions().contains(&to),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn only_submitted_is_expirable() {
        let expirable: Vec<_> = QuoteStatus::ALL.iter().filter(|s| s.is_expirable()).collect();
        assert_eq!(expirable, vec![&QuoteStatus::Submitted]);
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(
            serde_json::to_string(&QuoteStatus::UnderReview).unwrap(),
            "\"under_review\""
        );
        let status: QuoteStatus = serde_json::from_str("\"expired\"").unwrap();
        assert_eq!(status, QuoteStatus::Expired);
    }

    #[test]
    fn display_matches_serialized_form() {
        for status in QuoteStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status));
        }
    }
}
