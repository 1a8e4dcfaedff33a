//! Risk scorer - pure 0-100 scoring of quote attributes.
//!
//! The score is the sum of five components, clamped and rounded:
//!
//! | Component | Shape |
//! |-----------|-------|
//! | value | `value_weight * min(1, ln(1+v) / ln(1+reference_value))` |
//! | duration | `duration_weight * min(1, days / reference_duration_days)` |
//! | category | `category_points[cargo_category]` |
//! | mode | `mode_points[transport_mode]` |
//! | route | `max(country_points[origin], country_points[destination])` |
//!
//! Every component is non-decreasing in its input, so a larger shipment value
//! or a longer coverage period never lowers the score.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::foundation::{RiskScore, ValidationError};
use crate::domain::quote::Quote;

/// Scoring weights, loaded from configuration.
///
/// The shipped defaults are neutral placeholders; deployments replace them
/// with underwriting-approved values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    /// Points awarded to a shipment at or above `reference_value`.
    #[serde(default = "default_value_weight")]
    pub value_weight: f64,

    /// Value (minor units) at which the value component saturates.
    #[serde(default = "default_reference_value")]
    pub reference_value: u64,

    /// Points awarded to coverage at or above `reference_duration_days`.
    #[serde(default = "default_duration_weight")]
    pub duration_weight: f64,

    #[serde(default = "default_reference_duration_days")]
    pub reference_duration_days: u32,

    /// Extra points per cargo category (lowercase keys).
    #[serde(default)]
    pub category_points: BTreeMap<String, f64>,

    /// Extra points per transport mode (`air`, `ocean`, `road`, `rail`).
    #[serde(default)]
    pub mode_points: BTreeMap<String, f64>,

    /// Extra points per origin/destination country code.
    #[serde(default)]
    pub country_points: BTreeMap<String, f64>,
}

fn default_value_weight() -> f64 {
    50.0
}

fn default_reference_value() -> u64 {
    100_000_000
}

fn default_duration_weight() -> f64 {
    20.0
}

fn default_reference_duration_days() -> u32 {
    365
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            value_weight: default_value_weight(),
            reference_value: default_reference_value(),
            duration_weight: default_duration_weight(),
            reference_duration_days: default_reference_duration_days(),
            category_points: BTreeMap::new(),
            mode_points: BTreeMap::new(),
            country_points: BTreeMap::new(),
        }
    }
}

impl RiskWeights {
    /// Rejects weights that would make the score non-monotone or undefined.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_points("underwriting.risk.value_weight", self.value_weight)?;
        check_points("underwriting.risk.duration_weight", self.duration_weight)?;
        if self.reference_value < 2 {
            return Err(ValidationError::out_of_range(
                "underwriting.risk.reference_value",
                2,
                i64::MAX,
                self.reference_value as i64,
            ));
        }
        if self.reference_duration_days == 0 {
            return Err(ValidationError::out_of_range(
                "underwriting.risk.reference_duration_days",
                1,
                i64::from(u32::MAX),
                0,
            ));
        }
        for (table, points) in [
            ("category_points", &self.category_points),
            ("mode_points", &self.mode_points),
            ("country_points", &self.country_points),
        ] {
            for (key, value) in points {
                check_points(&format!("underwriting.risk.{}.{}", table, key), *value)?;
            }
        }
        Ok(())
    }
}

fn check_points(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::invalid_format(
            field,
            format!("must be a finite, non-negative number, got {}", value),
        ));
    }
    Ok(())
}

/// Per-component breakdown of a score, kept for the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: RiskScore,
    pub value_points: f64,
    pub duration_points: f64,
    pub category_points: f64,
    pub mode_points: f64,
    pub route_points: f64,
}

/// Pure, deterministic risk scorer.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    weights: RiskWeights,
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::new(RiskWeights::default())
    }
}

impl RiskScorer {
    /// Builds a scorer, normalizing lookup keys (categories lowercase,
    /// modes lowercase, countries uppercase).
    pub fn new(weights: RiskWeights) -> Self {
        let normalize = |points: &BTreeMap<String, f64>, upper: bool| {
            points
                .iter()
                .map(|(k, v)| {
                    let key = k.trim();
                    let key = if upper {
                        key.to_uppercase()
                    } else {
                        key.to_lowercase()
                    };
                    (key, *v)
                })
                .collect::<BTreeMap<_, _>>()
        };

        let weights = RiskWeights {
            category_points: normalize(&weights.category_points, false),
            mode_points: normalize(&weights.mode_points, false),
            country_points: normalize(&weights.country_points, true),
            ..weights
        };
        Self { weights }
    }

    pub fn weights(&self) -> &RiskWeights {
        &self.weights
    }

    pub fn score(&self, quote: &Quote) -> RiskScore {
        self.assess(quote).score
    }

    pub fn assess(&self, quote: &Quote) -> RiskAssessment {
        let shipment = quote.shipment();
        let w = &self.weights;

        let value = shipment.value.minor_units() as f64;
        let reference = w.reference_value.max(2) as f64;
        let value_points = w.value_weight.max(0.0) * (value.ln_1p() / reference.ln_1p()).min(1.0);

        let days = shipment.coverage.duration_days().max(0) as f64;
        let reference_days = f64::from(w.reference_duration_days.max(1));
        let duration_points = w.duration_weight.max(0.0) * (days / reference_days).min(1.0);

        let category_points = lookup(&w.category_points, shipment.cargo_category.as_str());
        let mode_points = lookup(&w.mode_points, &shipment.transport_mode.to_string());
        let route_points = lookup(&w.country_points, shipment.origin.country())
            .max(lookup(&w.country_points, shipment.destination.country()));

        let raw = value_points + duration_points + category_points + mode_points + route_points;

        RiskAssessment {
            score: RiskScore::from_raw(raw),
            value_points,
            duration_points,
            category_points,
            mode_points,
            route_points,
        }
    }
}

/// Missing keys and negative or non-finite entries contribute nothing.
fn lookup(points: &BTreeMap<String, f64>, key: &str) -> f64 {
    points
        .get(key)
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
        .max(0.0)
}
