//! REST planner client
//!
//! Talks to a planner proxy exposing `/recommend/destinations` and
//! `/recommend/itinerary`. One attempt per call; non-success statuses and
//! transport failures are network errors, undecodable bodies schema errors.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use super::RecommendationClient;
use super::schema::{DestinationEnvelope, DestinationRequest, ItineraryEnvelope, ItineraryRequest};
use crate::config::PlannerConfig;
use crate::models::{Enrichment, TravelPreferences, TripRecommendation};
use crate::{Result, TripAiError};

/// Responses slower than this are logged as warnings
const SLOW_RESPONSE: Duration = Duration::from_secs(20);

/// Planner client for the REST proxy
pub struct RestPlannerClient {
    client: Client,
    base_url: String,
}

impl RestPlannerClient {
    /// Create a new client against `base_url`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("TripAI/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TripAiError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_seconds.into()),
        )
    }

    /// POST a JSON body and decode the JSON answer
    #[instrument(skip(self, body))]
    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let start_time = Instant::now();
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Planner request to {} failed: {}", url, e);
                TripAiError::network(format!("request to {url} failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("Planner answered {} for {}: {}", status, url, detail);
            return Err(TripAiError::network(format!(
                "planner answered {} - {}",
                status,
                status.canonical_reason().unwrap_or("Unknown error")
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TripAiError::network(format!("failed to read planner response: {e}")))?;
        let decoded: R = serde_json::from_slice(&bytes).map_err(|e| {
            error!("Failed to parse planner response from {}: {}", url, e);
            TripAiError::schema(format!("invalid JSON from planner: {e}"))
        })?;

        let total_duration = start_time.elapsed();
        info!(
            "Planner call {} succeeded in {:.3}s",
            path,
            total_duration.as_secs_f64()
        );
        if total_duration > SLOW_RESPONSE {
            warn!(
                "Slow planner response detected: {:.3}s",
                total_duration.as_secs_f64()
            );
        }

        Ok(decoded)
    }
}

#[async_trait]
impl RecommendationClient for RestPlannerClient {
    async fn fetch_destinations(
        &self,
        prefs: &TravelPreferences,
    ) -> Result<Vec<TripRecommendation>> {
        let request = DestinationRequest::from_preferences(prefs)?;
        let envelope: DestinationEnvelope = self.post("/recommend/destinations", &request).await?;
        let trips = envelope.into_recommendations()?;
        info!("Received {} destination candidates", trips.len());
        Ok(trips)
    }

    async fn fetch_itinerary(
        &self,
        destination: &str,
        prefs: &TravelPreferences,
    ) -> Result<Enrichment> {
        let request = ItineraryRequest::from_preferences(destination, prefs)?;
        let envelope: ItineraryEnvelope = self.post("/recommend/itinerary", &request).await?;
        let enrichment = envelope.into_enrichment()?;
        info!(
            "Received {}-day itinerary for '{}'",
            enrichment.itinerary.len(),
            destination
        );
        Ok(enrichment)
    }
}
