//! Landmass outlines drawn when no map texture is available.
//!
//! Rings are stored as `[lng, lat]` degree pairs on disk and converted to
//! radians once at load time.

use crate::error::GlobeError;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_LANDMASS: &str = include_str!("../data/landmass.json");

#[derive(Debug, Deserialize)]
struct LandmassFile {
    rings: Vec<RingFile>,
}

#[derive(Debug, Deserialize)]
struct RingFile {
    #[serde(default)]
    name: String,
    points: Vec<[f64; 2]>,
}

/// A closed polygon, `(lat, lng)` in radians.
#[derive(Debug, Clone)]
pub struct Ring {
    pub name: String,
    pub points: Vec<(f64, f64)>,
    /// Mean latitude/longitude, used for front-face culling.
    pub centroid: (f64, f64),
}

#[derive(Debug, Clone, Default)]
pub struct Landmass {
    pub rings: Vec<Ring>,
}

impl Landmass {
    pub fn parse(json: &str) -> Result<Self, GlobeError> {
        let file: LandmassFile = serde_json::from_str(json)?;
        let rings: Vec<Ring> = file
            .rings
            .into_iter()
            .filter(|ring| ring.points.len() >= 3)
            .map(|ring| {
                let points: Vec<(f64, f64)> = ring
                    .points
                    .iter()
                    .map(|[lng, lat]| (lat.to_radians(), lng.to_radians()))
                    .collect();
                let n = points.len() as f64;
                let (sum_lat, sum_lng) = points
                    .iter()
                    .fold((0.0, 0.0), |(a, b), (lat, lng)| (a + lat, b + lng));
                Ring {
                    name: ring.name,
                    centroid: (sum_lat / n, sum_lng / n),
                    points,
                }
            })
            .collect();

        if rings.is_empty() {
            return Err(GlobeError::EmptyLandmass);
        }
        Ok(Self { rings })
    }

    /// Load rings from `path`, or the built-in continent outlines when `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, GlobeError> {
        match path {
            Some(path) => {
                let landmass = Self::parse(&fs::read_to_string(path)?)?;
                tracing::info!(path = %path.display(), rings = landmass.rings.len(), "loaded landmass");
                Ok(landmass)
            }
            None => Self::parse(DEFAULT_LANDMASS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_outlines_load() {
        let landmass = Landmass::load(None).unwrap();
        assert_eq!(landmass.rings.len(), 10);
        assert_eq!(landmass.rings[0].name, "North America");
    }

    #[test]
    fn centroid_is_vertex_mean() {
        let json = r#"{"rings": [{"points": [[0, 0], [10, 0], [10, 30], [0, 30]]}]}"#;
        let landmass = Landmass::parse(json).unwrap();
        let (lat, lng) = landmass.rings[0].centroid;
        assert!((lat.to_degrees() - 15.0).abs() < 1e-9);
        assert!((lng.to_degrees() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_rings_are_dropped() {
        let json = r#"{"rings": [{"points": [[0, 0], [1, 1]]}]}"#;
        assert!(matches!(Landmass::parse(json), Err(GlobeError::EmptyLandmass)));
    }
}
