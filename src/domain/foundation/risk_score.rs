//! Risk score value object (0-100 scale).

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// Normalized underwriting risk between 0 and 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct RiskScore(u8);

impl RiskScore {
    /// Lowest possible risk.
    pub const MIN: Self = Self(0);

    /// Highest possible risk.
    pub const MAX: Self = Self(100);

    /// Creates a RiskScore, returning error if out of range.
    pub fn try_new(value: u8) -> Result<Self, ValidationError> {
        if value > 100 {
            return Err(ValidationError::out_of_range(
                "risk_score",
                0,
                100,
                i64::from(value),
            ));
        }
        Ok(Self(value))
    }

    /// Rounds and clamps a raw score into the valid range.
    ///
    /// NaN maps to zero.
    pub fn from_raw(raw: f64) -> Self {
        if raw.is_nan() {
            return Self::MIN;
        }
        Self(raw.round().clamp(0.0, 100.0) as u8)
    }

    /// Returns the value as u8.
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for RiskScore {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<RiskScore> for u8 {
    fn from(score: RiskScore) -> Self {
        score.0
    }
}

impl fmt::Display for RiskScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_rejects_over_100() {
        match RiskScore::try_new(101) {
            Err(ValidationError::OutOfRange { field, actual, .. }) => {
                assert_eq!(field, "risk_score");
                assert_eq!(actual, 101);
            }
            other => panic!("Expected OutOfRange error, got {:?}", other),
        }
    }

    #[test]
    fn from_raw_rounds_and_clamps() {
        assert_eq!(RiskScore::from_raw(42.4).value(), 42);
        assert_eq!(RiskScore::from_raw(42.5).value(), 43);
        assert_eq!(RiskScore::from_raw(-7.0), RiskScore::MIN);
        assert_eq!(RiskScore::from_raw(250.0), RiskScore::MAX);
        assert_eq!(RiskScore::from_raw(f64::NAN), RiskScore::MIN);
    }

    #[test]
    fn deserialization_enforces_range() {
        let score: RiskScore = serde_json::from_str("75").unwrap();
        assert_eq!(score.value(), 75);
        assert!(serde_json::from_str::<RiskScore>("120").is_err());
    }
}
