//! Underwriting rules.
//!
//! Rules are data. Which values, cargo categories, routes or modes trigger a
//! rejection or a manual review is deployment configuration, so nothing here
//! hard-codes a business threshold. A rule pairs a [`RuleCondition`] with a
//! [`Severity`] and an optional customer-facing reason.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::ValidationError;
use crate::domain::quote::{CargoCategory, Shipment, ShipmentValue, TransportMode};

/// How a matching rule affects the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// The quote cannot be insured; forces a rejection.
    Hard,
    /// The quote needs human judgment; forces manual review.
    Soft,
}

/// Predicate over the declared shipment.
///
/// Empty filter lists match anything, so `route` with only
/// `destination_countries` applies to every cargo category and origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleCondition {
    /// Declared value strictly above `amount` (minor units).
    ShipmentValueAbove { amount: u64 },

    CargoCategoryIn { categories: Vec<CargoCategory> },

    Route {
        #[serde(default)]
        cargo_categories: Vec<CargoCategory>,
        #[serde(default)]
        origin_countries: Vec<String>,
        #[serde(default)]
        destination_countries: Vec<String>,
    },

    TransportModeIn {
        modes: Vec<TransportMode>,
        #[serde(default)]
        cargo_categories: Vec<CargoCategory>,
    },

    /// Coverage shorter than `min_days` or longer than `max_days`.
    CoverageDaysOutside {
        #[serde(default)]
        min_days: Option<i64>,
        #[serde(default)]
        max_days: Option<i64>,
    },
}

impl RuleCondition {
    /// Returns true if the shipment triggers this condition.
    pub fn matches(&self, shipment: &Shipment) -> bool {
        match self {
            RuleCondition::ShipmentValueAbove { amount } => shipment.value.minor_units() > *amount,
            RuleCondition::CargoCategoryIn { categories } => {
                categories.contains(&shipment.cargo_category)
            }
            RuleCondition::Route {
                cargo_categories,
                origin_countries,
                destination_countries,
            } => {
                matches_any(cargo_categories, &shipment.cargo_category)
                    && matches_country(origin_countries, shipment.origin.country())
                    && matches_country(destination_countries, shipment.destination.country())
            }
            RuleCondition::TransportModeIn {
                modes,
                cargo_categories,
            } => {
                modes.contains(&shipment.transport_mode)
                    && matches_any(cargo_categories, &shipment.cargo_category)
            }
            RuleCondition::CoverageDaysOutside { min_days, max_days } => {
                let days = shipment.coverage.duration_days();
                min_days.map_or(false, |min| days < min) || max_days.map_or(false, |max| days > max)
            }
        }
    }

    /// Generated reason text, used when a rule has no configured reason.
    pub fn describe(&self, shipment: &Shipment) -> String {
        match self {
            RuleCondition::ShipmentValueAbove { amount } => {
                let limit = ShipmentValue::new(*amount)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|_| "0.00".to_string());
                format!(
                    "Shipment value {} exceeds the limit of {}",
                    shipment.value, limit
                )
            }
            RuleCondition::CargoCategoryIn { .. } => {
                format!("Cargo category '{}' is not eligible", shipment.cargo_category)
            }
            RuleCondition::Route { .. } => format!(
                "Route {} -> {} is restricted for '{}' cargo",
                shipment.origin.country(),
                shipment.destination.country(),
                shipment.cargo_category
            ),
            RuleCondition::TransportModeIn { .. } => format!(
                "Transport by {} is restricted for '{}' cargo",
                shipment.transport_mode, shipment.cargo_category
            ),
            RuleCondition::CoverageDaysOutside { min_days, max_days } => {
                let bounds = match (min_days, max_days) {
                    (Some(min), Some(max)) => format!("{}-{} days", min, max),
                    (Some(min), None) => format!("at least {} days", min),
                    (None, Some(max)) => format!("at most {} days", max),
                    (None, None) => "any duration".to_string(),
                };
                format!(
                    "Coverage period of {} days is outside the allowed range ({})",
                    shipment.coverage.duration_days(),
                    bounds
                )
            }
        }
    }

    fn check(&self, rule_id: &str) -> Result<(), ValidationError> {
        let field = format!("underwriting.rules.{}", rule_id);
        match self {
            RuleCondition::ShipmentValueAbove { .. } => Ok(()),
            RuleCondition::CargoCategoryIn { categories } if categories.is_empty() => Err(
                ValidationError::empty_field(format!("{}.categories", field)),
            ),
            RuleCondition::CargoCategoryIn { .. } => Ok(()),
            RuleCondition::Route {
                cargo_categories,
                origin_countries,
                destination_countries,
            } => {
                if cargo_categories.is_empty()
                    && origin_countries.is_empty()
                    && destination_countries.is_empty()
                {
                    return Err(ValidationError::invalid_format(
                        field,
                        "route rule must restrict at least one of cargo, origin or destination",
                    ));
                }
                Ok(())
            }
            RuleCondition::TransportModeIn { modes, .. } if modes.is_empty() => {
                Err(ValidationError::empty_field(format!("{}.modes", field)))
            }
            RuleCondition::TransportModeIn { .. } => Ok(()),
            RuleCondition::CoverageDaysOutside { min_days, max_days } => match (min_days, max_days)
            {
                (None, None) => Err(ValidationError::invalid_format(
                    field,
                    "coverage rule needs min_days or max_days",
                )),
                (Some(min), Some(max)) if min > max => Err(ValidationError::invalid_format(
                    field,
                    format!("min_days {} exceeds max_days {}", min, max),
                )),
                _ => Ok(()),
            },
        }
    }
}

fn matches_any(filter: &[CargoCategory], category: &CargoCategory) -> bool {
    filter.is_empty() || filter.contains(category)
}

fn matches_country(filter: &[String], country: &str) -> bool {
    filter.is_empty() || filter.iter().any(|c| c.trim().eq_ignore_ascii_case(country))
}

/// A single configured underwriting rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwritingRule {
    pub id: String,
    pub severity: Severity,
    pub condition: RuleCondition,
    /// Customer-facing reason; generated from the condition when absent.
    #[serde(default)]
    pub reason: Option<String>,
}

impl UnderwritingRule {
    pub fn new(id: impl Into<String>, severity: Severity, condition: RuleCondition) -> Self {
        Self {
            id: id.into(),
            severity,
            condition,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Reason text reported when this rule fires for `shipment`.
    pub fn reason_for(&self, shipment: &Shipment) -> String {
        match &self.reason {
            Some(reason) if !reason.trim().is_empty() => reason.clone(),
            _ => self.condition.describe(shipment),
        }
    }
}

/// Ordered collection of underwriting rules.
///
/// Order determines the order of reasons reported to the customer; it never
/// changes the classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    rules: Vec<UnderwritingRule>,
}

impl RuleSet {
    /// Rule set with no rules: every well-formed quote is approved.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a rule set, checking rule ids and conditions.
    pub fn new(rules: Vec<UnderwritingRule>) -> Result<Self, ValidationError> {
        let set = Self { rules };
        set.validate()?;
        Ok(set)
    }

    /// Parses a YAML rules document (`rules: [...]`).
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ValidationError> {
        let set: RuleSet = serde_yaml::from_str(yaml)
            .map_err(|e| ValidationError::invalid_format("underwriting.rules", e.to_string()))?;
        set.validate()?;
        Ok(set)
    }

    pub fn rules(&self) -> &[UnderwritingRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Checks that ids are present and unique and that every condition is
    /// satisfiable.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for rule in &self.rules {
            if rule.id.trim().is_empty() {
                return Err(ValidationError::empty_field("underwriting.rules.id"));
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(ValidationError::invalid_format(
                    "underwriting.rules.id",
                    format!("duplicate rule id '{}'", rule.id),
                ));
            }
            rule.condition.check(&rule.id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quote::test_support::sample_shipment;
    use crate::domain::quote::Location;

    fn category(name: &str) -> CargoCategory {
        CargoCategory::new(name).unwrap()
    }

    #[test]
    fn value_ceiling_is_strict() {
        let shipment = sample_shipment();
        let at_limit = RuleCondition::ShipmentValueAbove {
            amount: shipment.value.minor_units(),
        };
        let below_limit = RuleCondition::ShipmentValueAbove {
            amount: shipment.value.minor_units() - 1,
        };

        assert!(!at_limit.matches(&shipment));
        assert!(below_limit.matches(&shipment));
    }

    #[test]
    fn route_matches_countries_case_insensitively() {
        let mut shipment = sample_shipment();
        shipment.destination = Location::new("IR", "Bandar Abbas", None).unwrap();

        let rule = RuleCondition::Route {
            cargo_categories: vec![],
            origin_countries: vec![],
            destination_countries: vec!["ir".to_string()],
        };
        assert!(rule.matches(&shipment));
    }

    #[test]
    fn route_requires_every_filter_to_match() {
        let shipment = sample_shipment();
        let rule = RuleCondition::Route {
            cargo_categories: vec![category("weapons")],
            origin_countries: vec!["DE".to_string()],
            destination_countries: vec![],
        };
        assert!(!rule.matches(&shipment));
    }

    #[test]
    fn transport_mode_rule_can_be_scoped_to_cargo() {
        let shipment = sample_shipment();
        let scoped = RuleCondition::TransportModeIn {
            modes: vec![TransportMode::Road],
            cargo_categories: vec![category("livestock")],
        };
        let unscoped = RuleCondition::TransportModeIn {
            modes: vec![TransportMode::Road],
            cargo_categories: vec![],
        };
        assert!(!scoped.matches(&shipment));
        assert!(unscoped.matches(&shipment));
    }

    #[test]
    fn coverage_bounds_are_exclusive_of_limits() {
        let shipment = sample_shipment();
        let days = shipment.coverage.duration_days();

        let inside = RuleCondition::CoverageDaysOutside {
            min_days: Some(days),
            max_days: Some(days),
        };
        let too_long = RuleCondition::CoverageDaysOutside {
            min_days: None,
            max_days: Some(days - 1),
        };
        assert!(!inside.matches(&shipment));
        assert!(too_long.matches(&shipment));
    }

    #[test]
    fn configured_reason_wins_over_generated_one() {
        let shipment = sample_shipment();
        let rule = UnderwritingRule::new(
            "road-review",
            Severity::Soft,
            RuleCondition::TransportModeIn {
                modes: vec![TransportMode::Road],
                cargo_categories: vec![],
            },
        );
        assert_eq!(
            rule.reason_for(&shipment),
            "Transport by road is restricted for 'general' cargo"
        );
        assert_eq!(
            rule.with_reason("Road freight needs review").reason_for(&shipment),
            "Road freight needs review"
        );
    }

    #[test]
    fn rule_set_rejects_duplicate_ids() {
        let condition = RuleCondition::ShipmentValueAbove { amount: 1 };
        let result = RuleSet::new(vec![
            UnderwritingRule::new("a", Severity::Hard, condition.clone()),
            UnderwritingRule::new("a", Severity::Soft, condition),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rule_set_rejects_unbounded_conditions() {
        let result = RuleSet::new(vec![UnderwritingRule::new(
            "open-route",
            Severity::Hard,
            RuleCondition::Route {
                cargo_categories: vec![],
                origin_countries: vec![],
                destination_countries: vec![],
            },
        )]);
        assert!(result.is_err());

        let result = RuleSet::new(vec![UnderwritingRule::new(
            "inverted",
            Severity::Soft,
            RuleCondition::CoverageDaysOutside {
                min_days: Some(10),
                max_days: Some(5),
            },
        )]);
        assert!(result.is_err());
    }

    #[test]
    fn rule_set_parses_yaml() {
        let yaml = r#"
rules:
  - id: embargo
    severity: hard
    condition:
      type: route
      destination_countries: [KP]
    reason: Destination is under embargo
  - id: long-cover
    severity: soft
    condition:
      type: coverage_days_outside
      max_days: 120
"#;
        let set = RuleSet::from_yaml_str(yaml).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.rules()[0].severity, Severity::Hard);
        assert_eq!(
            set.rules()[1].condition,
            RuleCondition::CoverageDaysOutside {
                min_days: None,
                max_days: Some(120)
            }
        );
    }

    #[test]
    fn rule_set_yaml_errors_are_reported() {
        assert!(RuleSet::from_yaml_str("rules: [{ id: x }]").is_err());
    }
}
