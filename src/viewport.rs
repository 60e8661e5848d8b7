//! Bounding region framing every route geometry

use serde::Serialize;

use crate::models::Coordinate;
use crate::{Result, TripError};

/// Axis-aligned box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingRegion {
    pub min: Coordinate,
    pub max: Coordinate,
}

impl BoundingRegion {
    #[must_use]
    pub fn center(&self) -> Coordinate {
        Coordinate {
            lat: (self.min.lat + self.max.lat) / 2.0,
            lng: (self.min.lng + self.max.lng) / 2.0,
        }
    }

    /// Grow each side by `fraction` of the span, clamped to valid coordinates.
    /// Degenerate (single point) regions stay degenerate.
    #[must_use]
    pub fn padded(&self, fraction: f64) -> Self {
        let fraction = fraction.max(0.0);
        let lat_pad = (self.max.lat - self.min.lat) * fraction;
        let lng_pad = (self.max.lng - self.min.lng) * fraction;
        Self {
            min: Coordinate {
                lat: (self.min.lat - lat_pad).max(-90.0),
                lng: (self.min.lng - lng_pad).max(-180.0),
            },
            max: Coordinate {
                lat: (self.max.lat + lat_pad).min(90.0),
                lng: (self.max.lng + lng_pad).min(180.0),
            },
        }
    }

    /// Great-circle distance between the corners
    #[must_use]
    pub fn diagonal_km(&self) -> f64 {
        self.min.haversine_km(&self.max)
    }

    #[must_use]
    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.min.lat..=self.max.lat).contains(&point.lat)
            && (self.min.lng..=self.max.lng).contains(&point.lng)
    }
}

/// Smallest region containing every coordinate of every path.
///
/// Fails with [`TripError::NoGeometry`] when all paths are empty; callers keep
/// whatever viewport they had before.
pub fn fit(paths: &[Vec<Coordinate>]) -> Result<BoundingRegion> {
    let mut points = paths.iter().flatten();
    let first = points.next().ok_or(TripError::NoGeometry)?;

    Ok(points.fold(
        BoundingRegion {
            min: *first,
            max: *first,
        },
        |region, point| BoundingRegion {
            min: Coordinate {
                lat: region.min.lat.min(point.lat),
                lng: region.min.lng.min(point.lng),
            },
            max: Coordinate {
                lat: region.max.lat.max(point.lat),
                lng: region.max.lng.max(point.lng),
            },
        },
    ))
}
