//! Underwriting domain services.
//!
//! Pure functions of quote attributes and configuration; no I/O, no clock,
//! no randomness. Safe to share across threads without locking.
//!
//! - `rules` - Configurable rule conditions and rule sets
//! - `validator` - Rule evaluation producing a [`ValidationResult`]
//! - `risk_scorer` - Weighted 0-100 risk score
//! - `decision` - Verdict to transition mapping and customer messages

pub mod decision;
mod risk_scorer;
mod rules;
mod validator;

pub use decision::{decide, decision_message, rejection_text, REASON_SEPARATOR};
pub use risk_scorer::{RiskAssessment, RiskScorer, RiskWeights};
pub use rules::{RuleCondition, RuleSet, Severity, UnderwritingRule};
pub use validator::{RuleViolation, TargetStatus, ValidationResult, Validator};
