//! Lettered map markers for a route's waypoints

use serde::Serialize;
use tracing::warn;

use crate::models::{Coordinate, Route};

/// One marker per letter of the alphabet
pub const MAX_MARKERS: usize = 26;

/// A labelled waypoint pin
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marker {
    pub position: Coordinate,
    pub label: char,
}

/// Markers for start, each intermediate stop and end, labelled `A`, `B`, ...
/// in travel order.
#[must_use]
pub fn build(route: &Route) -> Vec<Marker> {
    build_with_limit(route, MAX_MARKERS)
}

/// Like [`build`], capped at `limit` markers (never more than [`MAX_MARKERS`]).
///
/// Start and end are always kept; surplus interior stops are dropped.
#[must_use]
pub fn build_with_limit(route: &Route, limit: usize) -> Vec<Marker> {
    let limit = limit.clamp(2, MAX_MARKERS);
    let endpoints = usize::from(route.start_location.is_some())
        + usize::from(route.end_location.is_some());
    let room = limit - endpoints;

    let stops = &route.stop_locations;
    if stops.len() > room {
        warn!(
            "Route '{}' has {} stops, only the first {} get a marker",
            route.summary,
            stops.len(),
            room
        );
    }

    route
        .start_location
        .into_iter()
        .chain(stops.iter().copied().take(room))
        .chain(route.end_location)
        .zip('A'..='Z')
        .map(|(position, label)| Marker { position, label })
        .collect()
}

/// Markers for the selected route; empty when nothing is selectable
#[must_use]
pub fn build_selected(routes: &[Route], index: usize) -> Vec<Marker> {
    routes.get(index).map(build).unwrap_or_default()
}
