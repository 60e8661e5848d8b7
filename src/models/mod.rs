//! Data models for the trip planning pipeline
//!
//! This module contains the canonical, source-agnostic shapes organized by concern:
//! - Coordinate: WGS84 points
//! - Route: the normalized trip and its travel mode
//! - Weather, Alert, Event: context attached to every route

pub mod alert;
pub mod coordinate;
pub mod event;
pub mod route;
pub mod weather;

// Re-export all public types for convenient access
pub use alert::{Alert, Severity};
pub use coordinate::Coordinate;
pub use event::Event;
pub use route::{Route, TransitLeg, TravelMode};
pub use weather::WeatherSnapshot;
