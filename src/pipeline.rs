//! Plan pipeline: raw backend payload in, canonical routes and their
//! map/list presentation out

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::alerts;
use crate::config::DisplayConfig;
use crate::events::{self, GroupedEvents};
use crate::markers::{self, Marker};
use crate::models::{Alert, Route, Severity};
use crate::normalize::{self, DirectionsResponse, TransitResponse};
use crate::request::TripRequest;
use crate::viewport::{self, BoundingRegion};
use crate::{Result, TripError};

/// Backend payload, tagged by the endpoint that produced it
#[derive(Debug)]
pub enum RawPlan {
    Directions(DirectionsResponse),
    Transit(TransitResponse),
}

/// Normalize a raw plan for `request`.
///
/// Directions candidates without their own stop labels get the request's stops.
#[instrument(level = "debug", skip(raw))]
pub fn normalize(raw: &RawPlan, request: &TripRequest) -> Result<Vec<Route>> {
    let routes = match raw {
        RawPlan::Directions(response) => {
            let stops = request.effective_stops();
            normalize::from_directions(
                response,
                Some(request.origin),
                Some(request.destination),
                request.mode,
            )?
            .into_iter()
            .map(|mut route| {
                if route.stops.is_none() && !stops.is_empty() {
                    route.stops = Some(stops.to_vec());
                }
                route
            })
            .collect()
        }
        RawPlan::Transit(response) => {
            if !request.mode.uses_transit_planner() {
                warn!("Received a transit plan for a {} request", request.mode);
            }
            normalize::from_transit(response, Some(request.origin), Some(request.destination))?
        }
    };

    debug!("Plan normalized into {} routes", routes.len());
    Ok(routes)
}

/// How overviews are framed and labelled
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewOptions {
    pub max_markers: usize,
    /// Fraction of the region span added on each side
    pub viewport_padding: f64,
    /// Fall back to weather-derived alerts when a route carries weather but no alerts
    pub derive_alerts: bool,
}

impl Default for OverviewOptions {
    fn default() -> Self {
        Self {
            max_markers: markers::MAX_MARKERS,
            viewport_padding: 0.0,
            derive_alerts: false,
        }
    }
}

impl From<&DisplayConfig> for OverviewOptions {
    fn from(display: &DisplayConfig) -> Self {
        Self {
            max_markers: display.max_markers,
            viewport_padding: display.viewport_padding,
            derive_alerts: display.derive_alerts,
        }
    }
}

/// Everything a renderer needs for the selected route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteOverview {
    pub route: Route,
    pub markers: Vec<Marker>,
    /// `None` when no route has geometry; keep the previous viewport then
    pub viewport: Option<BoundingRegion>,
    pub events: GroupedEvents,
    pub alerts: Vec<Alert>,
    pub severity: Severity,
}

impl RouteOverview {
    /// Overview of `routes[selected]` with default options; `None` when the
    /// index is out of range.
    pub fn build<Tz: TimeZone>(
        routes: &[Route],
        selected: usize,
        now: &DateTime<Tz>,
    ) -> Option<Self> {
        Self::build_with(routes, selected, now, &OverviewOptions::default())
    }

    pub fn build_with<Tz: TimeZone>(
        routes: &[Route],
        selected: usize,
        now: &DateTime<Tz>,
        options: &OverviewOptions,
    ) -> Option<Self> {
        let route = routes.get(selected)?;

        let paths: Vec<_> = routes.iter().map(|r| r.path.clone()).collect();
        let viewport = match viewport::fit(&paths) {
            Ok(region) => Some(region.padded(options.viewport_padding)),
            Err(TripError::NoGeometry) => {
                debug!("No route geometry, viewport unchanged");
                None
            }
            Err(e) => {
                warn!("Viewport fitting failed: {}", e);
                None
            }
        };

        let alerts = match &route.weather {
            Some(weather) if options.derive_alerts && route.alerts.is_empty() => {
                alerts::derive_from_weather(weather)
            }
            _ => route.alerts.clone(),
        };

        Some(Self {
            route: route.clone(),
            markers: markers::build_with_limit(route, options.max_markers),
            viewport,
            events: events::group(&route.events_nearby, now),
            severity: alerts::resolve(&alerts),
            alerts,
        })
    }
}
