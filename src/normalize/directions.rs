//! Normalization of directions-proxy responses (driving, walking, bicycling)

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::context::RouteContext;
use super::{lenient_opt, lenient_opt_vec, lenient_vec, upstream_error};
use crate::Result;
use crate::models::coordinate::retain_valid;
use crate::models::{Coordinate, Route, TravelMode};
use crate::polyline;

/// Google status values that are not failures
const BENIGN_STATUSES: [&str; 2] = ["OK", "ZERO_RESULTS"];

/// Raw `/google_directions` payload. Route bodies are parsed leniently: a
/// malformed field or list element is dropped, never the whole plan.
#[derive(Debug, Default, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default, deserialize_with = "lenient_opt_vec")]
    pub routes: Option<Vec<RawDirectionsRoute>>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub origin_lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub origin_lon: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub destination_lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub destination_lon: Option<f64>,
    #[serde(default)]
    pub weather: Option<Value>,
    #[serde(default)]
    pub alerts: Option<Value>,
    #[serde(default)]
    pub events_nearby: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub error_message: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub status: Option<String>,
}

/// One candidate route as returned by the directions proxy
#[derive(Debug, Default, Deserialize)]
pub struct RawDirectionsRoute {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub legs: Vec<RawLeg>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub overview_polyline: Option<RawPolyline>,
    /// Pre-extracted polyline string some proxy versions send instead
    #[serde(default, deserialize_with = "lenient_opt")]
    pub polyline: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt_vec")]
    pub stops: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_opt_vec")]
    pub waypoint_locations: Option<Vec<Coordinate>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawPolyline {
    Encoded(String),
    Object {
        #[serde(default, deserialize_with = "lenient_opt")]
        points: Option<String>,
    },
}

#[derive(Debug, Default, Deserialize)]
pub struct RawLeg {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub duration: Option<RawMeasure>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub distance: Option<RawMeasure>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub start_location: Option<Coordinate>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub end_location: Option<Coordinate>,
}

/// `{ "value": 1234, "text": "21 mins" }`
#[derive(Debug, Default, Deserialize)]
pub struct RawMeasure {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub text: Option<String>,
}

impl DirectionsResponse {
    fn requested_origin(&self) -> Option<Coordinate> {
        Coordinate::new(self.origin_lat?, self.origin_lon?).ok()
    }

    fn requested_destination(&self) -> Option<Coordinate> {
        Coordinate::new(self.destination_lat?, self.destination_lon?).ok()
    }

    fn reported_error(&self) -> Option<String> {
        if let Some(message) = upstream_error(self.error.as_ref()) {
            return Some(message);
        }
        if let Some(message) = self.error_message.as_ref().filter(|m| !m.trim().is_empty()) {
            return Some(message.clone());
        }
        self.status
            .as_deref()
            .filter(|status| !BENIGN_STATUSES.contains(status))
            .map(|status| format!("Directions request failed with status {status}"))
    }
}

impl RawDirectionsRoute {
    fn encoded_polyline(&self) -> Option<&str> {
        match &self.overview_polyline {
            Some(RawPolyline::Encoded(points)) => Some(points),
            Some(RawPolyline::Object { points }) => points.as_deref(),
            None => self.polyline.as_deref(),
        }
    }

    fn decoded_path(&self, index: usize) -> Vec<Coordinate> {
        let Some(encoded) = self.encoded_polyline() else {
            return Vec::new();
        };
        polyline::decode(encoded).unwrap_or_else(|e| {
            warn!("Route {} has an undecodable polyline, drawing no path: {}", index, e);
            Vec::new()
        })
    }

    /// Interior waypoints: explicit locations, or the end of every leg but the last
    fn stop_locations(&self) -> Vec<Coordinate> {
        let locations = match &self.waypoint_locations {
            Some(locations) => locations.clone(),
            None => {
                let interior = self.legs.len().saturating_sub(1);
                self.legs[..interior]
                    .iter()
                    .filter_map(|leg| leg.end_location)
                    .collect()
            }
        };
        retain_valid(locations, "waypoint locations")
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Normalize a directions-proxy response into canonical routes.
///
/// Duration and distance come from the first leg only; routes with interior
/// waypoints therefore under-report both figures. Start and end are the
/// requested coordinates, falling back to the ones echoed by the proxy.
#[instrument(level = "debug", skip(raw))]
pub fn from_directions(
    raw: &DirectionsResponse,
    origin: Option<Coordinate>,
    destination: Option<Coordinate>,
    mode: TravelMode,
) -> Result<Vec<Route>> {
    if let Some(message) = raw.reported_error() {
        return Err(crate::TripError::upstream(message));
    }

    let candidates = match raw.routes.as_deref() {
        Some(candidates) if !candidates.is_empty() => candidates,
        _ => {
            debug!("Directions response contains no routes");
            return Ok(Vec::new());
        }
    };

    let context = RouteContext::from_raw(
        raw.weather.as_ref(),
        raw.alerts.as_ref(),
        raw.events_nearby.as_ref(),
    );
    let start_location = origin.or_else(|| raw.requested_origin());
    let end_location = destination.or_else(|| raw.requested_destination());

    let routes: Vec<Route> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let first_leg = candidate.legs.first();
            let duration_min = first_leg
                .and_then(|leg| leg.duration.as_ref())
                .and_then(|d| d.value)
                .map(|seconds| round_to(seconds / 60.0, 1));
            let distance_km = first_leg
                .and_then(|leg| leg.distance.as_ref())
                .and_then(|d| d.value)
                .map(|meters| round_to(meters / 1000.0, 2));

            let summary = candidate
                .summary
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map_or_else(|| format!("{mode} route"), str::to_string);

            Route {
                summary,
                mode,
                duration_min,
                distance_km,
                path: candidate.decoded_path(index),
                start_location,
                end_location,
                stops: candidate.stops.clone(),
                stop_locations: candidate.stop_locations(),
                transit_legs: Vec::new(),
                weather: context.weather.clone(),
                alerts: context.alerts.clone(),
                events_nearby: context.events_nearby.clone(),
            }
        })
        .collect();

    debug!("Normalized {} {} routes", routes.len(), mode);
    Ok(routes)
}
