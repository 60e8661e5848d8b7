//! Geographic coordinate model

use serde::{Deserialize, Serialize};

use crate::{Result, TripError};

/// A WGS84 point
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees (the transit planner spells it `lon`)
    #[serde(alias = "lon")]
    pub lng: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting values outside [-90, 90] x [-180, 180]
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let coordinate = Self { lat, lng };
        if coordinate.is_valid() {
            Ok(coordinate)
        } else {
            Err(TripError::validation(format!(
                "coordinate ({lat}, {lng}) is out of range"
            )))
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }

    /// Format as the `lat,lng` pair the directions proxy expects
    #[must_use]
    pub fn format_query(&self) -> String {
        format!("{},{}", self.lat, self.lng)
    }

    /// Round coordinates, e.g. for display
    #[must_use]
    pub fn rounded(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(5));
        let lat = (self.lat * multiplier).round() / multiplier;
        let lng = (self.lng * multiplier).round() / multiplier;
        (lat, lng)
    }

    pub(crate) fn haversine_km(&self, other: &Coordinate) -> f64 {
        haversine::distance(
            haversine::Location {
                latitude: self.lat,
                longitude: self.lng,
            },
            haversine::Location {
                latitude: other.lat,
                longitude: other.lng,
            },
            haversine::Units::Kilometers,
        )
    }
}

/// Keep the points that lie within coordinate bounds, logging the rest
pub(crate) fn retain_valid(points: Vec<Coordinate>, source: &str) -> Vec<Coordinate> {
    let before = points.len();
    let valid: Vec<Coordinate> = points.into_iter().filter(Coordinate::is_valid).collect();
    if valid.len() != before {
        tracing::warn!(
            "Dropped {} out-of-range points from {}",
            before - valid.len(),
            source
        );
    }
    valid
}
