//! Nearby event model

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

use super::Coordinate;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// An event happening close to a planned route.
///
/// Upstream feeds disagree on field names; they are reconciled into this shape
/// once, when the route is normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Start time as delivered upstream (ISO 8601, offset optional)
    #[serde(default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub distance_from_route_m: Option<f64>,
    #[serde(default)]
    pub capacity: Option<u64>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Coordinate>,
    /// Feed the event came from, e.g. "ticketmaster"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Event {
    /// Minimal event with a title and start time
    pub fn new(title: impl Into<String>, date_time: Option<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            url: None,
            date_time,
            venue: None,
            distance_from_route_m: None,
            capacity: None,
            address: None,
            description: None,
            location: None,
            source: None,
        }
    }

    /// Resolve the start time in `tz`.
    ///
    /// Timestamps carrying an offset are converted; timestamps without one are
    /// read as wall-clock time in `tz`. Returns `None` when the event has no
    /// usable timestamp.
    pub fn starts_at<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        let raw = self.date_time.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }

        if let Ok(with_offset) = DateTime::parse_from_rfc3339(raw) {
            return Some(with_offset.with_timezone(tz));
        }

        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
                return resolve_local(tz, naive);
            }
        }

        // Date-only listings start at local midnight
        let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
        resolve_local(tz, date.and_hms_opt(0, 0, 0)?)
    }

    /// Venue and address joined for display
    #[must_use]
    pub fn format_place(&self) -> Option<String> {
        match (&self.venue, &self.address) {
            (Some(venue), Some(address)) => Some(format!("{venue}, {address}")),
            (Some(venue), None) => Some(venue.clone()),
            (None, Some(address)) => Some(address.clone()),
            (None, None) => None,
        }
    }
}

/// Attach a zone to a wall-clock time. Times skipped by a forward DST jump
/// land on the same wall time one hour later; repeated times take the first.
fn resolve_local<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => Some(at),
        LocalResult::None => tz.from_local_datetime(&(naive + Duration::hours(1))).earliest(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike, Utc};
    use rstest::rstest;

    fn mountain() -> FixedOffset {
        FixedOffset::west_opt(7 * 3600).unwrap()
    }

    #[test]
    fn test_offset_timestamp_is_converted() {
        let event = Event::new("Concert", Some("2025-11-22T02:30:00Z".to_string()));
        let start = event.starts_at(&mountain()).unwrap();
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2025, 11, 21).unwrap());
        assert_eq!(start.hour(), 19);
    }

    #[rstest]
    #[case("2025-11-22T19:00:00")]
    #[case("2025-11-22T19:00:00.000")]
    #[case("2025-11-22T19:00")]
    #[case("2025-11-22 19:00:00")]
    fn test_naive_timestamp_is_local(#[case] raw: &str) {
        let event = Event::new("Game", Some(raw.to_string()));
        let start = event.starts_at(&mountain()).unwrap();
        assert_eq!(start.hour(), 19);
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2025, 11, 22).unwrap());
    }

    #[test]
    fn test_date_only_starts_at_midnight() {
        let event = Event::new("Fair", Some("2025-11-23".to_string()));
        let start = event.starts_at(&Utc).unwrap();
        assert_eq!(start.hour(), 0);
    }

    #[rstest]
    #[case(None)]
    #[case(Some(""))]
    #[case(Some("next tuesday"))]
    fn test_missing_or_garbage_timestamp(#[case] raw: Option<&str>) {
        let event = Event::new("Mystery", raw.map(str::to_string));
        assert!(event.starts_at(&Utc).is_none());
    }

    #[test]
    fn test_spring_forward_gap_moves_past_the_jump() {
        let denver = chrono_tz::America::Denver;
        let event = Event::new("Early run", Some("2026-03-08T02:30:00".to_string()));
        let start = event.starts_at(&denver).unwrap();
        assert_eq!(start.naive_local(), NaiveDate::from_ymd_opt(2026, 3, 8).unwrap().and_hms_opt(3, 30, 0).unwrap());
        assert_eq!(start.with_timezone(&Utc).hour(), 9);
    }

    #[test]
    fn test_repeated_fall_back_hour_takes_the_first() {
        let denver = chrono_tz::America::Denver;
        let event = Event::new("Late show", Some("2026-11-01T01:30:00".to_string()));
        let start = event.starts_at(&denver).unwrap();
        // 01:30 MDT, before the clocks go back
        assert_eq!(start.with_timezone(&Utc).hour(), 7);
    }

    #[test]
    fn test_format_place() {
        let mut event = Event::new("Talk", None);
        assert_eq!(event.format_place(), None);
        event.venue = Some("Macky Auditorium".to_string());
        event.address = Some("1595 Pleasant St".to_string());
        assert_eq!(
            event.format_place().as_deref(),
            Some("Macky Auditorium, 1595 Pleasant St")
        );
    }
}
