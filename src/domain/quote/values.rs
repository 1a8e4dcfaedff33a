//! Shipment value objects carried by a quote.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Category of goods being insured, e.g. `electronics` or `perishables`.
///
/// Categories are open-ended business vocabulary, normalized to trimmed
/// lowercase so configured rules compare reliably.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CargoCategory(String);

impl CargoCategory {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let normalized = value.into().trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::empty_field("cargo_category"));
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CargoCategory {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CargoCategory> for String {
    fn from(category: CargoCategory) -> Self {
        category.0
    }
}

impl fmt::Display for CargoCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Declared value of the insured shipment, in minor currency units (cents).
///
/// Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ShipmentValue(u64);

impl ShipmentValue {
    pub fn new(minor_units: u64) -> Result<Self, ValidationError> {
        if minor_units == 0 {
            return Err(ValidationError::out_of_range(
                "shipment_value",
                1,
                i64::MAX,
                0,
            ));
        }
        Ok(Self(minor_units))
    }

    pub fn minor_units(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for ShipmentValue {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ShipmentValue> for u64 {
    fn from(value: ShipmentValue) -> Self {
        value.0
    }
}

impl fmt::Display for ShipmentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// How the cargo travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Air,
    Ocean,
    Road,
    Rail,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransportMode::Air => "air",
            TransportMode::Ocean => "ocean",
            TransportMode::Road => "road",
            TransportMode::Rail => "rail",
        };
        write!(f, "{}", s)
    }
}

/// Origin or destination of a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LocationRaw")]
pub struct Location {
    /// ISO 3166 alpha-2 or alpha-3 code, uppercase.
    country: String,
    city: String,
    postal_code: Option<String>,
}

impl Location {
    /// Creates a location, normalizing the country code to uppercase.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if city or country is blank
    /// - `InvalidFormat` if the country is not a 2-3 letter code
    pub fn new(
        country: impl Into<String>,
        city: impl Into<String>,
        postal_code: Option<String>,
    ) -> Result<Self, ValidationError> {
        let country = country.into().trim().to_uppercase();
        let city = city.into().trim().to_string();

        if country.is_empty() {
            return Err(ValidationError::empty_field("country"));
        }
        if !(2..=3).contains(&country.len()) || !country.chars().all(|c| c.is_ascii_alphabetic())
        {
            return Err(ValidationError::invalid_format(
                "country",
                format!("expected a 2-3 letter country code, got '{}'", country),
            ));
        }
        if city.is_empty() {
            return Err(ValidationError::empty_field("city"));
        }

        Ok(Self {
            country,
            city,
            postal_code: postal_code
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty()),
        })
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code.as_deref()
    }
}

/// Wire shape of a [`Location`] before normalization.
#[derive(Deserialize)]
struct LocationRaw {
    country: String,
    city: String,
    #[serde(default)]
    postal_code: Option<String>,
}

impl TryFrom<LocationRaw> for Location {
    type Error = ValidationError;

    fn try_from(raw: LocationRaw) -> Result<Self, Self::Error> {
        Self::new(raw.country, raw.city, raw.postal_code)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.city, self.country)
    }
}

/// Dates during which an approved policy would be in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "CoveragePeriodRaw")]
pub struct CoveragePeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl CoveragePeriod {
    /// # Errors
    ///
    /// - `InvalidFormat` if `end` is before `start`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::invalid_format(
                "coverage_period",
                format!("coverage ends {} before it starts {}", end, start),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of covered days, counting both the start and end date.
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[derive(Deserialize)]
struct CoveragePeriodRaw {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<CoveragePeriodRaw> for CoveragePeriod {
    type Error = ValidationError;

    fn try_from(raw: CoveragePeriodRaw) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

/// Everything the customer declared about the shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    pub cargo_category: CargoCategory,
    pub value: ShipmentValue,
    pub origin: Location,
    pub destination: Location,
    pub transport_mode: TransportMode,
    pub coverage: CoveragePeriod,
}
