//! LLM planner client
//!
//! Calls an OpenAI-compatible Chat Completions endpoint directly and asks for
//! a JSON answer. The same client backs the planner proxy server.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, instrument, warn};

use super::RecommendationClient;
use super::prompt::{SYSTEM_PROMPT, destination_prompt, itinerary_prompt, strip_code_fence};
use super::schema::{DestinationEnvelope, DestinationRequest, ItineraryEnvelope, ItineraryRequest};
use crate::config::PlannerConfig;
use crate::models::{Enrichment, TravelPreferences, TripRecommendation};
use crate::{Result, TripAiError};

/// Generative planner backed by a chat completions API
pub struct LlmPlannerClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    language: String,
    recommendation_count: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl LlmPlannerClient {
    /// Create a new client from planner configuration
    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        let llm = &config.llm;
        let api_key = llm
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| TripAiError::config("LLM planner requires an API key"))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .build()
            .map_err(|e| TripAiError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            api_key,
            model: llm.model.clone(),
            temperature: llm.temperature,
            language: llm.language.clone(),
            recommendation_count: llm.recommendation_count,
        })
    }

    /// Ask the model for destinations for an already serialized request
    pub async fn recommend_destinations(
        &self,
        request: &DestinationRequest,
    ) -> Result<DestinationEnvelope> {
        let prompt = destination_prompt(request, self.recommendation_count, &self.language);
        self.complete_json(&prompt).await
    }

    /// Ask the model for an itinerary for an already serialized request
    pub async fn recommend_itinerary(
        &self,
        request: &ItineraryRequest,
    ) -> Result<ItineraryEnvelope> {
        let prompt = itinerary_prompt(request, &self.language);
        self.complete_json(&prompt).await
    }

    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "temperature": self.temperature,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": prompt },
            ],
        })
    }

    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T> {
        let url = format!("{}/chat/completions", self.base_url);
        let start_time = Instant::now();
        debug!(prompt_len = prompt.len(), "complete_json: called");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request_body(prompt))
            .send()
            .await
            .map_err(|e| {
                warn!("LLM request failed: {}", e);
                TripAiError::network(format!("LLM request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            error!("LLM API answered {}: {}", status, detail);
            return Err(TripAiError::network(format!("LLM API answered {status}")));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            TripAiError::schema(format!("unexpected chat completion payload: {e}"))
        })?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| TripAiError::schema("LLM answer has no message content"))?;

        info!(
            "LLM completion in {:.3}s ({} chars)",
            start_time.elapsed().as_secs_f64(),
            content.len()
        );

        serde_json::from_str(strip_code_fence(&content)).map_err(|e| {
            error!("LLM answer is not the expected JSON: {}", e);
            TripAiError::schema(format!("LLM answer is not valid JSON: {e}"))
        })
    }
}

#[async_trait]
impl RecommendationClient for LlmPlannerClient {
    async fn fetch_destinations(
        &self,
        prefs: &TravelPreferences,
    ) -> Result<Vec<TripRecommendation>> {
        let request = DestinationRequest::from_preferences(prefs)?;
        let trips = self
            .recommend_destinations(&request)
            .await?
            .into_recommendations()?;

        if trips.len() != self.recommendation_count as usize {
            warn!(
                "Asked for {} destinations, model returned {}",
                self.recommendation_count,
                trips.len()
            );
        }
        Ok(trips)
    }

    async fn fetch_itinerary(
        &self,
        destination: &str,
        prefs: &TravelPreferences,
    ) -> Result<Enrichment> {
        let request = ItineraryRequest::from_preferences(destination, prefs)?;
        self.recommend_itinerary(&request).await?.into_enrichment()
    }
}
