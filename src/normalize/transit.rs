//! Normalization of transit-planner responses (walk, ride, walk)

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::{debug, instrument};

use super::context::RouteContext;
use super::{lenient_opt, lenient_opt_vec, parse_list, upstream_error};
use crate::models::coordinate::retain_valid;
use crate::models::{Coordinate, Route, TransitLeg, TravelMode};
use crate::{Result, TripError};

/// Raw `/plan_transit_full` payload. Like the directions payload it is parsed
/// leniently: broken legs or walking points are dropped individually.
#[derive(Debug, Default, Deserialize)]
pub struct TransitResponse {
    /// Sent either as `{ "legs": [...] }` or as the bare leg list
    #[serde(default, rename = "transit", deserialize_with = "transit_legs")]
    pub legs: Vec<RawTransitLeg>,
    #[serde(default, deserialize_with = "lenient_opt_vec")]
    pub walk_to_stop: Option<Vec<Coordinate>>,
    #[serde(default, deserialize_with = "lenient_opt_vec")]
    pub walk_to_destination: Option<Vec<Coordinate>>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub origin_stop: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub destination_stop: Option<String>,
    #[serde(default)]
    pub weather: Option<Value>,
    #[serde(default)]
    pub alerts: Option<Value>,
    #[serde(default)]
    pub events_nearby: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawTransitLeg {
    #[serde(default, deserialize_with = "lenient_opt")]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub route_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub trip_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub from_stop: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub to_stop: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub departure: Option<String>,
    #[serde(default, deserialize_with = "lenient_opt")]
    pub arrival: Option<String>,
    #[serde(default, deserialize_with = "lenient_id_list")]
    pub intermediate_stops: Vec<String>,
}

fn transit_legs<'de, D>(deserializer: D) -> std::result::Result<Vec<RawTransitLeg>, D::Error>
where
    D: Deserializer<'de>,
{
    let legs = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(mut itinerary)) => itinerary.remove("legs").unwrap_or(Value::Null),
        Some(legs) => legs,
        None => Value::Null,
    };
    Ok(parse_list(legs))
}

/// GTFS ids show up as strings or bare numbers; blank ids count as absent
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(id_string))
}

fn lenient_id_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?
        .unwrap_or_default()
        .iter()
        .filter_map(id_string)
        .collect())
}

impl From<&RawTransitLeg> for TransitLeg {
    fn from(leg: &RawTransitLeg) -> Self {
        Self {
            route_id: leg.route_id.clone(),
            trip_id: leg.trip_id.clone(),
            from_stop: leg.from_stop.clone(),
            to_stop: leg.to_stop.clone(),
            departure: leg.departure.clone(),
            arrival: leg.arrival.clone(),
        }
    }
}

fn transit_summary(legs: &[RawTransitLeg]) -> String {
    let Some(first) = legs.first() else {
        return "Walking only".to_string();
    };
    match first.route_id.as_ref().or(first.trip_id.as_ref()) {
        Some(id) => format!("Transit via {id}"),
        None => "Transit".to_string(),
    }
}

/// Normalize a transit-planner response. The planner returns a single trip,
/// so the result holds at most one route.
///
/// Only the walking segments are drawn; the ride itself has no geometry in
/// the planner's answer. No aggregate duration or distance is reported.
#[instrument(level = "debug", skip(raw))]
pub fn from_transit(
    raw: &TransitResponse,
    origin: Option<Coordinate>,
    destination: Option<Coordinate>,
) -> Result<Vec<Route>> {
    if let Some(message) = upstream_error(raw.error.as_ref()) {
        return Err(TripError::upstream(message));
    }

    let legs = raw.legs.as_slice();

    let mut path = raw.walk_to_stop.clone().unwrap_or_default();
    path.extend(raw.walk_to_destination.iter().flatten().copied());
    let path = retain_valid(path, "transit walking segments");

    if legs.is_empty() && path.is_empty() {
        debug!("Transit response contains neither legs nor walking segments");
        return Ok(Vec::new());
    }

    let stops = (!legs.is_empty()).then(|| {
        legs.iter()
            .flat_map(|leg| leg.intermediate_stops.iter().cloned())
            .collect::<Vec<String>>()
    });

    let context = RouteContext::from_raw(
        raw.weather.as_ref(),
        raw.alerts.as_ref(),
        raw.events_nearby.as_ref(),
    );

    let route = Route {
        summary: transit_summary(legs),
        mode: TravelMode::Transit,
        duration_min: None,
        distance_km: None,
        path,
        start_location: origin,
        end_location: destination,
        stops,
        stop_locations: Vec::new(),
        transit_legs: legs.iter().map(TransitLeg::from).collect(),
        weather: context.weather,
        alerts: context.alerts,
        events_nearby: context.events_nearby,
    };

    debug!(
        "Normalized transit trip '{}' with {} legs",
        route.summary,
        route.transit_legs.len()
    );
    Ok(vec![route])
}
