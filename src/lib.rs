//! `tripcast` - Route-result normalization and aggregation for multi-modal trip planning
//!
//! This library turns directions-proxy and transit-planner responses into one
//! canonical route shape, and derives map markers, viewports, event listings
//! and alert severities from it.

pub mod alerts;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod markers;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod polyline;
pub mod request;
pub mod store;
pub mod viewport;

// Re-export core types for public API
pub use client::BackendClient;
pub use config::TripcastConfig;
pub use error::TripError;
pub use events::GroupedEvents;
pub use markers::Marker;
pub use models::{Alert, Coordinate, Event, Route, Severity, TransitLeg, TravelMode, WeatherSnapshot};
pub use pipeline::{RawPlan, RouteOverview};
pub use polyline::DecodeError;
pub use request::TripRequest;
pub use store::{RequestTicket, RouteStore};
pub use viewport::BoundingRegion;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripError>;
