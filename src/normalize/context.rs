//! Weather, alert and event context shared by every route of one response
//!
//! Both backends attach the same context at the top level of their payloads,
//! but spell it slightly differently. Every field is parsed leniently: one bad
//! element is dropped with a warning instead of failing the whole plan.

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::models::{Alert, Coordinate, Event, Severity, WeatherSnapshot};

/// Context copied onto each normalized route
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteContext {
    pub weather: Option<WeatherSnapshot>,
    pub alerts: Vec<Alert>,
    pub events_nearby: Vec<Event>,
}

impl RouteContext {
    /// Build the context from the raw top-level `weather`, `alerts` and
    /// `events_nearby` values.
    ///
    /// `weather` may be a flat snapshot or an envelope
    /// `{ current, api_alerts, custom_alerts }`; the envelope's alerts are used
    /// only when no top-level `alerts` value exists.
    pub fn from_raw(
        weather: Option<&Value>,
        alerts: Option<&Value>,
        events: Option<&Value>,
    ) -> Self {
        let (weather, envelope_alerts) = match weather {
            Some(value) if is_envelope(value) => (
                value.get("current").and_then(parse_weather),
                Some(parse_alerts(value)),
            ),
            Some(value) => (parse_weather(value), None),
            None => (None, None),
        };

        let alerts = match alerts {
            Some(value) => parse_alerts(value),
            None => envelope_alerts.unwrap_or_default(),
        };

        Self {
            weather,
            alerts,
            events_nearby: events.map(parse_events).unwrap_or_default(),
        }
    }
}

fn is_envelope(value: &Value) -> bool {
    value.get("current").is_some()
}

fn parse_weather(value: &Value) -> Option<WeatherSnapshot> {
    if value.is_null() {
        return None;
    }
    match WeatherSnapshot::deserialize(value) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!("Ignoring incomplete weather snapshot: {}", e);
            None
        }
    }
}

/// Alerts arrive either as a plain list or grouped as
/// `{ api_alerts: [...], custom_alerts: [...] }`. Grouped provider alerts
/// come first, followed by the locally derived ones.
fn parse_alerts(value: &Value) -> Vec<Alert> {
    let items: Vec<&Value> = match value {
        Value::Array(list) => list.iter().collect(),
        Value::Object(groups) => ["api_alerts", "custom_alerts"]
            .iter()
            .filter_map(|key| groups.get(*key))
            .filter_map(Value::as_array)
            .flatten()
            .collect(),
        Value::Null => Vec::new(),
        other => {
            warn!("Ignoring alerts of unexpected shape: {}", other);
            Vec::new()
        }
    };

    items
        .into_iter()
        .filter_map(|item| match RawAlert::deserialize(item) {
            Ok(raw) => Some(raw.into_alert()),
            Err(e) => {
                warn!("Skipping malformed alert: {}", e);
                None
            }
        })
        .collect()
}

fn parse_events(value: &Value) -> Vec<Event> {
    let Some(items) = value.as_array() else {
        if !value.is_null() {
            warn!("Ignoring events_nearby that is not a list");
        }
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match RawEvent::deserialize(item) {
            Ok(raw) => Some(raw.into_event()),
            Err(e) => {
                warn!("Skipping malformed event: {}", e);
                None
            }
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct RawAlert {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    severity: Option<Value>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

impl RawAlert {
    fn into_alert(self) -> Alert {
        let severity = match &self.severity {
            Some(Value::String(s)) => Severity::parse_lenient(s),
            _ => Severity::default(),
        };
        Alert {
            title: self.title.unwrap_or_else(|| "Weather alert".to_string()),
            message: self.message.unwrap_or_default(),
            severity,
            kind: self.kind,
        }
    }
}

/// Event as sent by either feed. The ticketing shape uses
/// `title`/`start_time`/`venue`; the live feed uses `name`/`date_time`/`venue_name`.
#[derive(Debug, Deserialize)]
struct RawEvent {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    date_time: Option<String>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    venue_name: Option<String>,
    #[serde(default)]
    distance_from_route_m: Option<f64>,
    #[serde(default)]
    capacity: Option<Value>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    source: Option<String>,
}

/// Synonym table: the first spelling of each pair wins when both are present.
fn first_present(primary: Option<String>, synonym: Option<String>) -> Option<String> {
    primary
        .filter(|s| !s.trim().is_empty())
        .or_else(|| synonym.filter(|s| !s.trim().is_empty()))
}

impl RawEvent {
    fn into_event(self) -> Event {
        let location = match (self.lat, self.lon) {
            (Some(lat), Some(lng)) => Coordinate::new(lat, lng).ok(),
            _ => None,
        };

        Event {
            id: self.id.and_then(|id| match id {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            }),
            title: first_present(self.title, self.name)
                .unwrap_or_else(|| "Untitled event".to_string()),
            url: self.url,
            date_time: first_present(self.start_time, self.date_time),
            venue: first_present(self.venue, self.venue_name),
            distance_from_route_m: self.distance_from_route_m,
            capacity: self.capacity.as_ref().and_then(parse_capacity),
            address: self.address,
            description: self.description.filter(|d| !d.is_empty()),
            location,
            source: self.source,
        }
    }
}

fn parse_capacity(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
