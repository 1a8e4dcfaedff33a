//! Underwriting configuration: rule set and risk weights
//!
//! Rules come either inline (`underwriting.rules`) or from a standalone YAML
//! document (`underwriting.rules_path`). With neither, the rule set is empty
//! and every well-formed quote is approved.

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use crate::domain::underwriting::{RiskScorer, RiskWeights, RuleSet, UnderwritingRule, Validator};

/// Underwriting configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnderwritingConfig {
    /// Inline rules
    #[serde(default)]
    pub rules: Vec<UnderwritingRule>,

    /// Path to a YAML rules document (`rules: [...]`)
    pub rules_path: Option<PathBuf>,

    /// Risk scoring weights
    #[serde(default)]
    pub risk: RiskWeights,
}

impl UnderwritingConfig {
    /// Resolve the configured rule set, reading `rules_path` if set.
    pub fn rule_set(&self) -> Result<RuleSet, ValidationError> {
        match &self.rules_path {
            Some(_) if !self.rules.is_empty() => Err(ValidationError::ConflictingRuleSources),
            Some(path) => {
                let yaml = std::fs::read_to_string(path).map_err(|e| {
                    ValidationError::RulesFileUnreadable {
                        path: path.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(RuleSet::from_yaml_str(&yaml)?)
            }
            None => Ok(RuleSet::new(self.rules.clone())?),
        }
    }

    /// Build the validator for the configured rules.
    pub fn validator(&self) -> Result<Validator, ValidationError> {
        Ok(Validator::new(self.rule_set()?))
    }

    /// Build the scorer for the configured weights.
    pub fn scorer(&self) -> Result<RiskScorer, ValidationError> {
        self.risk.validate()?;
        Ok(RiskScorer::new(self.risk.clone()))
    }

    /// Validate underwriting configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.rule_set()?;
        self.risk.validate()?;
        Ok(())
    }
}
