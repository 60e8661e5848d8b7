//! Canonical route model shared by every travel mode

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Alert, Coordinate, Event, WeatherSnapshot};
use crate::TripError;

/// Travel modes the planner understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    pub const ALL: [TravelMode; 4] = [
        TravelMode::Driving,
        TravelMode::Walking,
        TravelMode::Bicycling,
        TravelMode::Transit,
    ];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }

    /// Transit goes to the dedicated planner, everything else to the directions proxy
    #[must_use]
    pub fn uses_transit_planner(&self) -> bool {
        matches!(self, TravelMode::Transit)
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = TripError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        TravelMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| {
                let valid: Vec<&str> = TravelMode::ALL.iter().map(TravelMode::as_str).collect();
                TripError::validation(format!(
                    "Invalid mode '{}'. Must be one of: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

/// One ride on a transit vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitLeg {
    pub route_id: Option<String>,
    pub trip_id: Option<String>,
    pub from_stop: Option<String>,
    pub to_stop: Option<String>,
    /// Departure clock time, `HH:MM:SS`
    pub departure: Option<String>,
    /// Arrival clock time, `HH:MM:SS`
    pub arrival: Option<String>,
}

/// Source-agnostic trip representation consumed by everything downstream.
///
/// Only the normalizers build routes; consumers treat them as read-only values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub summary: String,
    pub mode: TravelMode,
    pub duration_min: Option<f64>,
    pub distance_km: Option<f64>,
    pub path: Vec<Coordinate>,
    pub start_location: Option<Coordinate>,
    pub end_location: Option<Coordinate>,
    pub stops: Option<Vec<String>>,
    /// Coordinates of the intermediate stops, in travel order, when known
    pub stop_locations: Vec<Coordinate>,
    pub transit_legs: Vec<TransitLeg>,
    pub weather: Option<WeatherSnapshot>,
    pub alerts: Vec<Alert>,
    pub events_nearby: Vec<Event>,
}

impl Route {
    /// Format duration for display, e.g. "1 h 05 min"
    #[must_use]
    pub fn format_duration(&self) -> Option<String> {
        let minutes = self.duration_min?;
        let total = minutes.round() as i64;
        if total >= 60 {
            Some(format!("{} h {:02} min", total / 60, total % 60))
        } else {
            Some(format!("{total} min"))
        }
    }

    /// Format distance for display
    #[must_use]
    pub fn format_distance(&self) -> Option<String> {
        self.distance_km.map(|km| format!("{km:.1} km"))
    }
}
