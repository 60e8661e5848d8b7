//! Holder for the route set currently on screen
//!
//! Every plan request takes a ticket before it is sent. When its result comes
//! back it is published with that ticket; results of superseded requests are
//! discarded and an accepted result replaces the whole previous set.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::models::Route;

/// Identifies one plan request; later requests get larger tickets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RequestTicket(u64);

/// An immutable, complete result of one request
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct RouteSet {
    /// `None` until the first result is published
    pub ticket: Option<RequestTicket>,
    pub routes: Vec<Route>,
}

#[derive(Debug)]
pub struct RouteStore {
    issued: AtomicU64,
    sender: watch::Sender<Arc<RouteSet>>,
}

impl Default for RouteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteStore {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(Arc::new(RouteSet::default()));
        Self {
            issued: AtomicU64::new(0),
            sender,
        }
    }

    /// Issue the ticket for a new request, superseding all earlier ones
    pub fn begin(&self) -> RequestTicket {
        let ticket = RequestTicket(self.issued.fetch_add(1, Ordering::SeqCst) + 1);
        debug!("Issued plan ticket {:?}", ticket);
        ticket
    }

    /// Replace the route set with `routes` if `ticket` is the newest issued.
    /// Returns whether the result was accepted.
    pub fn publish(&self, ticket: RequestTicket, routes: Vec<Route>) -> bool {
        let mut routes = Some(routes);
        let accepted = self.sender.send_if_modified(|current| {
            let newest = self.issued.load(Ordering::SeqCst);
            let supersedes = current.ticket.is_none_or(|shown| ticket > shown);
            if ticket.0 != newest || !supersedes {
                return false;
            }
            *current = Arc::new(RouteSet {
                ticket: Some(ticket),
                routes: routes.take().unwrap_or_default(),
            });
            true
        });

        if accepted {
            info!("Showing routes of ticket {:?}", ticket);
        } else {
            debug!("Discarding stale result of ticket {:?}", ticket);
        }
        accepted
    }

    /// The route set currently shown
    #[must_use]
    pub fn current(&self) -> Arc<RouteSet> {
        Arc::clone(&self.sender.borrow())
    }

    /// Watch for replacements of the route set
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<RouteSet>> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TravelMode;

    fn route(summary: &str) -> Route {
        Route {
            summary: summary.to_string(),
            mode: TravelMode::Driving,
            duration_min: Some(10.0),
            distance_km: Some(5.0),
            path: vec![],
            start_location: None,
            end_location: None,
            stops: None,
            stop_locations: vec![],
            transit_legs: vec![],
            weather: None,
            alerts: vec![],
            events_nearby: vec![],
        }
    }

    fn summaries(set: &RouteSet) -> Vec<&str> {
        set.routes.iter().map(|r| r.summary.as_str()).collect()
    }

    #[test]
    fn test_starts_empty() {
        let store = RouteStore::new();
        let current = store.current();
        assert!(current.ticket.is_none());
        assert!(current.routes.is_empty());
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let store = RouteStore::new();
        let slow = store.begin();
        let fast = store.begin();

        assert!(store.publish(fast, vec![route("Fast")]));
        assert!(!store.publish(slow, vec![route("Slow")]));
        assert_eq!(summaries(&store.current()), ["Fast"]);
        assert_eq!(store.current().ticket, Some(fast));
    }

    #[test]
    fn test_superseded_request_cannot_publish_first() {
        let store = RouteStore::new();
        let old = store.begin();
        let _new = store.begin();
        assert!(!store.publish(old, vec![route("Old")]));
        assert!(store.current().routes.is_empty());
    }

    #[test]
    fn test_publish_replaces_whole_set() {
        let store = RouteStore::new();
        let first = store.begin();
        assert!(store.publish(first, vec![route("A"), route("B"), route("C")]));

        let before = store.current();
        let second = store.begin();
        assert!(store.publish(second, vec![route("D")]));

        assert_eq!(summaries(&store.current()), ["D"]);
        // Earlier snapshots are untouched
        assert_eq!(summaries(&before), ["A", "B", "C"]);
    }

    #[test]
    fn test_same_ticket_publishes_once() {
        let store = RouteStore::new();
        let ticket = store.begin();
        assert!(store.publish(ticket, vec![route("A")]));
        assert!(!store.publish(ticket, vec![route("B")]));
        assert_eq!(summaries(&store.current()), ["A"]);
    }

    #[tokio::test]
    async fn test_subscribers_see_replacements() {
        let store = RouteStore::new();
        let mut receiver = store.subscribe();

        let ticket = store.begin();
        assert!(store.publish(ticket, vec![route("Live")]));

        receiver.changed().await.unwrap();
        assert_eq!(summaries(&receiver.borrow_and_update()), ["Live"]);

        // A rejected publish does not wake subscribers
        assert!(!store.publish(ticket, vec![route("Ignored")]));
        assert!(!receiver.has_changed().unwrap());
    }
}
