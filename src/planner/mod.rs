//! Recommendation client boundary
//!
//! Everything that crosses into the external planner goes through
//! [`RecommendationClient`]. Calls are single-attempt: there is no retry or
//! backoff, a failure is reported to the caller as-is.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

pub mod images;
pub mod llm;
pub mod prompt;
pub mod rest;
pub mod schema;

pub use images::ImageLookup;
pub use llm::LlmPlannerClient;
pub use rest::RestPlannerClient;
pub use schema::{DestinationRequest, ItineraryRequest};

use crate::Result;
use crate::config::{PlannerBackend, PlannerConfig};
use crate::models::{Enrichment, TravelPreferences, TripRecommendation};

/// External planner that proposes destinations and builds itineraries
#[async_trait]
pub trait RecommendationClient: Send + Sync {
    /// Ask for candidate destinations. Returned trips carry no itinerary.
    async fn fetch_destinations(&self, prefs: &TravelPreferences)
    -> Result<Vec<TripRecommendation>>;

    /// Ask for the day-by-day itinerary and attractions of one destination
    async fn fetch_itinerary(
        &self,
        destination: &str,
        prefs: &TravelPreferences,
    ) -> Result<Enrichment>;
}

/// Create a recommendation client based on the configured backend
pub fn create_client(config: &PlannerConfig) -> Result<Arc<dyn RecommendationClient>> {
    match config.backend {
        PlannerBackend::Rest => {
            debug!(base_url = %config.base_url, "create_client: REST planner");
            Ok(Arc::new(RestPlannerClient::from_config(config)?))
        }
        PlannerBackend::Llm => {
            debug!(model = %config.llm.model, "create_client: LLM planner");
            Ok(Arc::new(LlmPlannerClient::from_config(config)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TripAiError;

    #[test]
    fn test_create_rest_client() {
        let config = PlannerConfig::default();
        assert!(create_client(&config).is_ok());
    }

    #[test]
    fn test_create_llm_client_without_key_fails() {
        let mut config = PlannerConfig::default();
        config.backend = PlannerBackend::Llm;
        config.llm.api_key = None;
        let err = create_client(&config).err().unwrap();
        assert!(matches!(err, TripAiError::Config { .. }));
    }
}
