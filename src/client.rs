//! HTTP client for the directions proxy and the transit planner

use reqwest::{Client, Response};
use tracing::{debug, info, instrument};

use crate::config::BackendConfig;
use crate::models::{Coordinate, Route, TravelMode};
use crate::pipeline::{self, RawPlan};
use crate::request::TripRequest;
use crate::{Result, TripError};

/// Issues plan requests. Failed requests are reported, never retried.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    directions_base_url: String,
    transit_base_url: String,
    alternatives: bool,
}

impl BackendClient {
    /// Create a new client
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("tripcast/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            directions_base_url: config.directions_base_url.trim_end_matches('/').to_string(),
            transit_base_url: config.transit_base_url.trim_end_matches('/').to_string(),
            alternatives: config.alternatives,
        })
    }

    /// A request carrying the configured defaults
    #[must_use]
    pub fn request(&self, origin: Coordinate, destination: Coordinate, mode: TravelMode) -> TripRequest {
        TripRequest::new(origin, destination, mode).with_alternatives(self.alternatives)
    }

    /// Fetch the raw plan from whichever backend serves `request.mode`
    #[instrument(skip(self), fields(mode = %request.mode))]
    pub async fn fetch(&self, request: &TripRequest) -> Result<RawPlan> {
        request.validate()?;

        if request.mode.uses_transit_planner() {
            let url = format!("{}/plan_transit_full", self.transit_base_url);
            info!("Requesting transit plan from {}", url);
            let response = self
                .client
                .post(&url)
                .json(&request.transit_body())
                .send()
                .await?;
            let body = successful_body(response).await?;
            Ok(RawPlan::Transit(serde_json::from_str(&body)?))
        } else {
            let url = format!(
                "{}/google_directions?{}",
                self.directions_base_url,
                request.directions_query()
            );
            info!("Requesting {} directions", request.mode);
            debug!("GET {}", url);
            let response = self.client.get(&url).send().await?;
            let body = successful_body(response).await?;
            Ok(RawPlan::Directions(serde_json::from_str(&body)?))
        }
    }

    /// Fetch and normalize
    pub async fn plan(&self, request: &TripRequest) -> Result<Vec<Route>> {
        let raw = self.fetch(request).await?;
        pipeline::normalize(&raw, request)
    }
}

/// Body of a 2xx response; anything else becomes an upstream error carrying
/// the status and the body verbatim.
async fn successful_body(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(TripError::upstream(format!("{status}: {body}")));
    }
    Ok(body)
}
