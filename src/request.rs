//! Trip plan requests and their backend encodings

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{Coordinate, TravelMode};
use crate::{Result, TripError};

/// Google Directions accepts at most this many intermediate waypoints
pub const MAX_WAYPOINTS: usize = 25;

/// What the user asked to plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: Coordinate,
    pub destination: Coordinate,
    /// Intermediate stop labels in travel order
    #[serde(default)]
    pub stops: Vec<String>,
    pub mode: TravelMode,
    /// Departure time; the transit planner assumes "now" when absent
    #[serde(default)]
    pub depart_at: Option<DateTime<Utc>>,
    /// Ask the directions proxy for alternative routes
    #[serde(default)]
    pub alternatives: bool,
}

/// JSON body of `POST /plan_transit_full`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitPlanBody {
    pub origin: LatLon,
    pub destination: LatLon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depart_at: Option<String>,
}

/// The transit planner spells longitude `lon`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl From<Coordinate> for LatLon {
    fn from(c: Coordinate) -> Self {
        Self {
            lat: c.lat,
            lon: c.lng,
        }
    }
}

/// Split a `;`-separated stop list, dropping blank entries
#[must_use]
pub fn parse_stops(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl TripRequest {
    pub fn new(origin: Coordinate, destination: Coordinate, mode: TravelMode) -> Self {
        Self {
            origin,
            destination,
            stops: Vec::new(),
            mode,
            depart_at: None,
            alternatives: false,
        }
    }

    /// Set intermediate stops from a `;`-separated list
    #[must_use]
    pub fn with_stops(mut self, raw: &str) -> Self {
        self.stops = parse_stops(raw);
        self
    }

    #[must_use]
    pub fn with_departure(mut self, depart_at: DateTime<Utc>) -> Self {
        self.depart_at = Some(depart_at);
        self
    }

    #[must_use]
    pub fn with_alternatives(mut self, alternatives: bool) -> Self {
        self.alternatives = alternatives;
        self
    }

    /// Check the request before it is sent
    pub fn validate(&self) -> Result<()> {
        for (name, point) in [("origin", &self.origin), ("destination", &self.destination)] {
            if !point.is_valid() {
                return Err(TripError::validation(format!(
                    "{name} ({}, {}) is out of range",
                    point.lat, point.lng
                )));
            }
        }

        if self.stops.len() > MAX_WAYPOINTS {
            return Err(TripError::validation(format!(
                "At most {MAX_WAYPOINTS} stops are supported, got {}",
                self.stops.len()
            )));
        }

        Ok(())
    }

    /// Stops the backend will actually route through. Transit plans go
    /// origin to destination directly.
    #[must_use]
    pub fn effective_stops(&self) -> &[String] {
        if self.mode.uses_transit_planner() && !self.stops.is_empty() {
            warn!(
                "Transit plans ignore intermediate stops, dropping {}",
                self.stops.len()
            );
            return &[];
        }
        &self.stops
    }

    /// Query string for `GET /google_directions`
    #[must_use]
    pub fn directions_query(&self) -> String {
        let mut params = vec![
            ("origin", self.origin.format_query()),
            ("destination", self.destination.format_query()),
            ("mode", self.mode.to_string()),
            ("alternatives", self.alternatives.to_string()),
        ];
        let stops = self.effective_stops();
        if !stops.is_empty() {
            params.push(("waypoints", stops.join("|")));
        }

        params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Body for `POST /plan_transit_full`
    #[must_use]
    pub fn transit_body(&self) -> TransitPlanBody {
        TransitPlanBody {
            origin: self.origin.into(),
            destination: self.destination.into(),
            depart_at: self
                .depart_at
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::json;

    fn boulder() -> Coordinate {
        Coordinate::new(40.015, -105.2705).unwrap()
    }

    fn denver() -> Coordinate {
        Coordinate::new(39.7392, -104.9903).unwrap()
    }

    #[rstest]
    #[case("", vec![])]
    #[case("Pearl St", vec!["Pearl St"])]
    #[case(" Pearl St ; ; Flatirons;", vec!["Pearl St", "Flatirons"])]
    fn test_parse_stops(#[case] raw: &str, #[case] expected: Vec<&str>) {
        assert_eq!(parse_stops(raw), expected);
    }

    #[test]
    fn test_directions_query() {
        let request = TripRequest::new(boulder(), denver(), TravelMode::Driving)
            .with_alternatives(true);
        assert_eq!(
            request.directions_query(),
            "origin=40.015%2C-105.2705&destination=39.7392%2C-104.9903&mode=driving&alternatives=true"
        );
    }

    #[test]
    fn test_directions_query_with_waypoints() {
        let request = TripRequest::new(boulder(), denver(), TravelMode::Bicycling)
            .with_stops("Pearl St;Union Station");
        let query = request.directions_query();
        assert!(query.contains("mode=bicycling"));
        assert!(query.contains("alternatives=false"));
        assert!(query.ends_with("&waypoints=Pearl%20St%7CUnion%20Station"));
    }

    #[test]
    fn test_transit_ignores_stops() {
        let request = TripRequest::new(boulder(), denver(), TravelMode::Transit).with_stops("A;B");
        assert!(request.effective_stops().is_empty());
        assert!(!request.directions_query().contains("waypoints"));
    }

    #[test]
    fn test_transit_body() {
        let depart = Utc.with_ymd_and_hms(2025, 11, 22, 16, 0, 0).unwrap();
        let request = TripRequest::new(boulder(), denver(), TravelMode::Transit).with_departure(depart);
        let body = serde_json::to_value(request.transit_body()).unwrap();
        assert_eq!(
            body,
            json!({
                "origin": {"lat": 40.015, "lon": -105.2705},
                "destination": {"lat": 39.7392, "lon": -104.9903},
                "depart_at": "2025-11-22T16:00:00Z"
            })
        );

        let without = TripRequest::new(boulder(), denver(), TravelMode::Transit);
        let body = serde_json::to_value(without.transit_body()).unwrap();
        assert!(body.get("depart_at").is_none());
    }

    #[test]
    fn test_validate() {
        assert!(TripRequest::new(boulder(), denver(), TravelMode::Walking).validate().is_ok());

        let bad_origin = Coordinate { lat: 91.0, lng: 0.0 };
        let err = TripRequest::new(bad_origin, denver(), TravelMode::Walking)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("origin"));

        let many = vec!["x"; MAX_WAYPOINTS + 1].join(";");
        let request = TripRequest::new(boulder(), denver(), TravelMode::Driving).with_stops(&many);
        assert!(matches!(request.validate(), Err(TripError::Validation { .. })));
    }
}
