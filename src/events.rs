//! Grouping of nearby events into today and later days

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone};
use serde::Serialize;
use tracing::debug;

use crate::models::Event;

/// Events split by calendar day in the viewer's time zone
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupedEvents {
    /// Events on the same calendar day as `now`, chronological
    pub today: Vec<Event>,
    /// Every other day, keyed and ordered by date
    pub upcoming: BTreeMap<NaiveDate, Vec<Event>>,
}

impl GroupedEvents {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.upcoming.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.today.len() + self.upcoming.values().map(Vec::len).sum::<usize>()
    }
}

/// Bucket `events` by day relative to `now`.
///
/// Timestamps are converted into `now`'s zone before truncating to a day;
/// events without a parseable start time are left out. Events starting at the
/// same instant keep their input order.
pub fn group<Tz: TimeZone>(events: &[Event], now: &DateTime<Tz>) -> GroupedEvents {
    let tz = now.timezone();
    let today = now.date_naive();

    let mut timed: Vec<(DateTime<Tz>, &Event)> = events
        .iter()
        .filter_map(|event| match event.starts_at(&tz) {
            Some(start) => Some((start, event)),
            None => {
                debug!("Event '{}' has no usable start time, not listed", event.title);
                None
            }
        })
        .collect();
    timed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut grouped = GroupedEvents::default();
    for (start, event) in timed {
        let day = start.date_naive();
        if day == today {
            grouped.today.push(event.clone());
        } else {
            grouped.upcoming.entry(day).or_default().push(event.clone());
        }
    }
    grouped
}
