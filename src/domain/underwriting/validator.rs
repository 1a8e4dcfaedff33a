//! Quote validator - applies the configured rule set to a quote.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::rules::{RuleSet, Severity};
use crate::domain::foundation::QuoteStatus;
use crate::domain::quote::Quote;

/// Status the validator recommends for a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Approved,
    UnderReview,
    Rejected,
}

impl From<TargetStatus> for QuoteStatus {
    fn from(target: TargetStatus) -> Self {
        match target {
            TargetStatus::Approved => QuoteStatus::Approved,
            TargetStatus::UnderReview => QuoteStatus::UnderReview,
            TargetStatus::Rejected => QuoteStatus::Rejected,
        }
    }
}

impl fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", QuoteStatus::from(*self))
    }
}

/// A rule that fired during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule_id: String,
    pub severity: Severity,
    pub reason: String,
}

/// Structured verdict for one quote.
///
/// `reasons` is empty iff `target_status == Approved`, in rule order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub target_status: TargetStatus,
    pub reasons: Vec<String>,
    #[serde(default)]
    pub violations: Vec<RuleViolation>,
}

impl ValidationResult {
    /// Verdict with no rule fired.
    pub fn approved() -> Self {
        Self {
            is_valid: true,
            target_status: TargetStatus::Approved,
            reasons: Vec::new(),
            violations: Vec::new(),
        }
    }

    fn from_violations(violations: Vec<RuleViolation>) -> Self {
        let hard = violations.iter().any(|v| v.severity == Severity::Hard);
        let soft = violations.iter().any(|v| v.severity == Severity::Soft);

        let target_status = if hard {
            TargetStatus::Rejected
        } else if soft {
            TargetStatus::UnderReview
        } else {
            TargetStatus::Approved
        };

        Self {
            is_valid: !hard,
            target_status,
            reasons: violations.iter().map(|v| v.reason.clone()).collect(),
            violations,
        }
    }
}

/// Pure, deterministic quote validator.
///
/// Hard-fail rules reject, soft-fail rules send the quote to review, and a
/// quote that trips no rule is approved. A hard failure outranks any number
/// of soft ones.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    rules: RuleSet,
}

impl Validator {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn validate(&self, quote: &Quote) -> ValidationResult {
        let shipment = quote.shipment();
        let violations = self
            .rules
            .rules()
            .iter()
            .filter(|rule| rule.condition.matches(shipment))
            .map(|rule| RuleViolation {
                rule_id: rule.id.clone(),
                severity: rule.severity,
                reason: rule.reason_for(shipment),
            })
            .collect();

        ValidationResult::from_violations(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{QuoteId, Timestamp};
    use crate::domain::quote::test_support::sample_shipment;
    use crate::domain::quote::{Location, ShipmentValue, TransportMode};
    use crate::domain::underwriting::rules::{RuleCondition, UnderwritingRule};
    use proptest::prelude::*;

    fn quote() -> Quote {
        Quote::new(QuoteId::new(), sample_shipment(), Timestamp::now())
    }

    fn value_ceiling(severity: Severity, amount: u64) -> UnderwritingRule {
        UnderwritingRule::new(
            format!("value-{:?}", severity),
            severity,
            RuleCondition::ShipmentValueAbove { amount },
        )
    }

    fn road_review() -> UnderwritingRule {
        UnderwritingRule::new(
            "road-review",
            Severity::Soft,
            RuleCondition::TransportModeIn {
                modes: vec![TransportMode::Road],
                cargo_categories: vec![],
            },
        )
        .with_reason("Road freight needs review")
    }

    #[test]
    fn no_rules_approves() {
        let result = Validator::default().validate(&quote());
        assert_eq!(result, ValidationResult::approved());
    }

    #[test]
    fn soft_failure_sends_to_review_but_stays_valid() {
        let validator = Validator::new(RuleSet::new(vec![road_review()]).unwrap());
        let result = validator.validate(&quote());

        assert!(result.is_valid);
        assert_eq!(result.target_status, TargetStatus::UnderReview);
        assert_eq!(result.reasons, vec!["Road freight needs review".to_string()]);
    }

    #[test]
    fn hard_failure_outranks_soft_failure() {
        let validator = Validator::new(
            RuleSet::new(vec![road_review(), value_ceiling(Severity::Hard, 100)]).unwrap(),
        );
        let result = validator.validate(&quote());

        assert!(!result.is_valid);
        assert_eq!(result.target_status, TargetStatus::Rejected);
        assert_eq!(result.reasons.len(), 2);
        assert_eq!(result.reasons[0], "Road freight needs review");
    }

    #[test]
    fn reason_order_follows_rule_order_but_classification_does_not() {
        let forward = Validator::new(
            RuleSet::new(vec![road_review(), value_ceiling(Severity::Hard, 100)]).unwrap(),
        )
        .validate(&quote());
        let reversed = Validator::new(
            RuleSet::new(vec![value_ceiling(Severity::Hard, 100), road_review()]).unwrap(),
        )
        .validate(&quote());

        assert_eq!(forward.target_status, reversed.target_status);
        assert_eq!(forward.is_valid, reversed.is_valid);
        assert_eq!(forward.reasons[0], reversed.reasons[1]);
    }

    #[test]
    fn rules_that_do_not_match_are_ignored() {
        let mut shipment = sample_shipment();
        shipment.origin = Location::new("FR", "Paris", None).unwrap();
        let quote = Quote::new(QuoteId::new(), shipment, Timestamp::now());

        let validator = Validator::new(
            RuleSet::new(vec![UnderwritingRule::new(
                "german-origin",
                Severity::Hard,
                RuleCondition::Route {
                    cargo_categories: vec![],
                    origin_countries: vec!["DE".to_string()],
                    destination_countries: vec![],
                },
            )])
            .unwrap(),
        );
        assert_eq!(validator.validate(&quote).target_status, TargetStatus::Approved);
    }

    #[test]
    fn violations_record_rule_ids() {
        let validator = Validator::new(RuleSet::new(vec![road_review()]).unwrap());
        let result = validator.validate(&quote());
        assert_eq!(result.violations[0].rule_id, "road-review");
        assert_eq!(result.violations[0].severity, Severity::Soft);
    }

    #[test]
    fn target_status_maps_onto_quote_status() {
        assert_eq!(QuoteStatus::from(TargetStatus::UnderReview), QuoteStatus::UnderReview);
        assert_eq!(TargetStatus::Rejected.to_string(), "rejected");
    }

    proptest! {
        #[test]
        fn repeated_validation_gives_equal_results(
            value in 1u64..10_000_000_000,
            hard_ceiling in 1u64..10_000_000_000,
            soft_ceiling in 1u64..10_000_000_000,
            mode in prop::sample::select(vec![
                TransportMode::Air,
                TransportMode::Ocean,
                TransportMode::Road,
                TransportMode::Rail,
            ]),
        ) {
            let mut shipment = sample_shipment();
            shipment.value = ShipmentValue::new(value).unwrap();
            shipment.transport_mode = mode;
            let quote = Quote::new(QuoteId::new(), shipment, Timestamp::now());

            let validator = Validator::new(
                RuleSet::new(vec![
                    value_ceiling(Severity::Hard, hard_ceiling),
                    value_ceiling(Severity::Soft, soft_ceiling),
                    road_review(),
                ])
                .unwrap(),
            );

            let first = validator.validate(&quote);
            let second = validator.validate(&quote);
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.is_valid, value <= hard_ceiling);
        }
    }
}
