//! Career locations shown on the globe.
//!
//! The first location is the primary one: every connection arc starts
//! there. Locations are loaded once and never mutated afterwards.

use crate::error::GlobeError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_LOCATIONS: &str = include_str!("../data/locations.json");

/// One geographic point of interest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Location {
    #[serde(alias = "country")]
    pub country_name: String,
    #[serde(alias = "flag", default)]
    pub flag_glyph: String,
    #[serde(alias = "cities", default)]
    pub city_names: Vec<String>,
    #[serde(alias = "years", default)]
    pub years_label: String,
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
    #[serde(alias = "details", default)]
    pub detail_text: String,
}

impl Location {
    /// Latitude and longitude in radians.
    pub fn radians(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }

    fn validate(&self) -> Result<(), GlobeError> {
        let invalid = |reason: String| GlobeError::InvalidLocation {
            country: self.country_name.clone(),
            reason,
        };
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(invalid(format!("latitude {} outside [-90, 90]", self.latitude)));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(invalid(format!("longitude {} outside [-180, 180]", self.longitude)));
        }
        Ok(())
    }
}

/// Parse a JSON array of locations and check coordinate ranges.
pub fn parse_locations(json: &str) -> Result<Vec<Location>, GlobeError> {
    let locations: Vec<Location> = serde_json::from_str(json)?;
    for location in &locations {
        location.validate()?;
    }
    Ok(locations)
}

/// Load locations from `path`, or the built-in career set when `None`.
pub fn load_locations(path: Option<&Path>) -> Result<Vec<Location>, GlobeError> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)?;
            let locations = parse_locations(&json)?;
            tracing::info!(path = %path.display(), count = locations.len(), "loaded locations");
            Ok(locations)
        }
        None => parse_locations(DEFAULT_LOCATIONS),
    }
}
