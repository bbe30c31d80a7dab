//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the geoip-enrich domain.
//! They have no external dependencies and contain only business logic.

use crate::domain::value_objects::UNKNOWN;
use serde::Serialize;

/// Geographic information resolved from an IP address.
///
/// Fields hold whatever the database provided. Before a record is exposed
/// to the next stage it goes through [`GeoRecord::normalized`], after which
/// no field is empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct GeoRecord {
    /// Country code (ISO 3166-1 alpha-2)
    pub country: String,
    /// First subdivision code (ISO 3166-2 suffix, e.g. "CA")
    pub region: String,
    /// City name (English)
    pub city: String,
}

impl GeoRecord {
    pub fn new(
        country: impl Into<String>,
        region: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            region: region.into(),
            city: city.into(),
        }
    }

    /// Record with every field set to the unknown sentinel.
    pub fn unknown() -> Self {
        Self::new(UNKNOWN, UNKNOWN, UNKNOWN)
    }

    /// Record carrying only a country, as produced by country databases.
    pub fn country_only(country: impl Into<String>) -> Self {
        Self::new(country, "", "")
    }

    /// Rewrite empty fields to the unknown sentinel.
    pub fn normalized(mut self) -> Self {
        for field in [&mut self.country, &mut self.region, &mut self.city] {
            if field.is_empty() {
                *field = UNKNOWN.to_string();
            }
        }
        self
    }

    /// True when no field is empty.
    pub fn is_normalized(&self) -> bool {
        !self.country.is_empty() && !self.region.is_empty() && !self.city.is_empty()
    }

    /// True when every field is the unknown sentinel.
    pub fn is_unknown(&self) -> bool {
        self.country == UNKNOWN && self.region == UNKNOWN && self.city == UNKNOWN
    }
}
