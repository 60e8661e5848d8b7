//! Route normalization
//!
//! Turns the two heterogeneous backend payloads into the canonical [`Route`]
//! shape:
//! - directions: driving, walking and bicycling candidates from the directions proxy
//! - transit: the single walk/ride/walk trip from the transit planner
//! - context: weather, alerts and nearby events shared by both
//!
//! [`Route`]: crate::models::Route

pub mod context;
pub mod directions;
pub mod transit;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

pub use context::RouteContext;
pub use directions::{DirectionsResponse, from_directions};
pub use transit::{TransitResponse, from_transit};

/// Extract the message of a backend `error` field.
///
/// `null`, `false` and blank strings mean "no error". Objects report their
/// `message` or `detail`, falling back to the raw JSON.
pub(crate) fn upstream_error(error: Option<&Value>) -> Option<String> {
    match error? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) if message.trim().is_empty() => None,
        Value::String(message) => Some(message.clone()),
        Value::Object(fields) => Some(
            ["message", "detail"]
                .iter()
                .filter_map(|key| fields.get(*key))
                .find_map(Value::as_str)
                .map_or_else(|| Value::Object(fields.clone()).to_string(), str::to_string),
        ),
        other => Some(other.to_string()),
    }
}

/// Last path segment of `T`'s type name, for log messages
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Parse every element of a JSON list on its own. Malformed elements are
/// dropped with a warning; `null` counts as an empty list.
pub(crate) fn parse_list<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value(item) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!("Skipping malformed {} entry: {}", short_type_name::<T>(), e);
                    None
                }
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            warn!(
                "Expected a list of {}, ignoring: {}",
                short_type_name::<T>(),
                other
            );
            Vec::new()
        }
    }
}

/// `deserialize_with` for lists whose elements may individually be broken
pub(crate) fn lenient_vec<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(parse_list(
        Option::<Value>::deserialize(deserializer)?.unwrap_or(Value::Null),
    ))
}

/// Like [`lenient_vec`], keeping "absent" (`None`) apart from "empty"
pub(crate) fn lenient_opt_vec<'de, D, T>(
    deserializer: D,
) -> std::result::Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(value @ Value::Array(_)) => Some(parse_list(value)),
        Some(other) => {
            warn!("Expected a list of {}, ignoring: {}", short_type_name::<T>(), other);
            None
        }
    })
}

/// `deserialize_with` for optional fields: a value of the wrong shape is
/// treated as absent instead of failing the payload
pub(crate) fn lenient_opt<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Ignoring malformed {}: {}", short_type_name::<T>(), e);
                None
            }
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(null), None)]
    #[case(json!(false), None)]
    #[case(json!("   "), None)]
    #[case(json!("No route found"), Some("No route found"))]
    #[case(json!({"message": "quota exceeded", "code": 429}), Some("quota exceeded"))]
    #[case(json!({"detail": "origin is required"}), Some("origin is required"))]
    #[case(json!(true), Some("true"))]
    fn test_upstream_error(#[case] error: Value, #[case] expected: Option<&str>) {
        assert_eq!(upstream_error(Some(&error)).as_deref(), expected);
    }

    #[test]
    fn test_parse_list_keeps_good_elements() {
        let points: Vec<crate::models::Coordinate> = parse_list(json!([
            {"lat": 40.0, "lon": -105.0},
            {"lat": 40.1, "lon": null},
            "garbage",
            {"lat": 40.2, "lng": -105.2}
        ]));
        assert_eq!(points.len(), 2);
        assert_eq!(points[1].lat, 40.2);

        assert!(parse_list::<String>(json!(null)).is_empty());
        assert!(parse_list::<String>(json!({"not": "a list"})).is_empty());
    }

    #[test]
    fn test_absent_error_field() {
        assert_eq!(upstream_error(None), None);
    }

    #[test]
    fn test_object_without_message_is_reported_raw() {
        let error = json!({"code": 500});
        assert_eq!(upstream_error(Some(&error)).as_deref(), Some(r#"{"code":500}"#));
    }
}
