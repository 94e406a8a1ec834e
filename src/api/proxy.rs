//! Planner proxy routes
//!
//! Serves `/recommend/destinations` and `/recommend/itinerary` on top of the
//! LLM planner, so front-ends and the REST planner client never hold the
//! model API key.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    response::Json,
    routing::{get, post},
};
use futures::future::join_all;
use serde_json::{Value, json};
use tracing::info;

use super::ApiError;
use crate::planner::schema::{DestinationEnvelope, ItineraryEnvelope};
use crate::planner::{DestinationRequest, ImageLookup, ItineraryRequest, LlmPlannerClient};

struct ProxyState {
    planner: LlmPlannerClient,
    images: ImageLookup,
}

pub fn router(planner: LlmPlannerClient, images: ImageLookup) -> Router {
    let state = Arc::new(ProxyState { planner, images });
    Router::new()
        .route("/", get(root))
        .route("/recommend/destinations", post(recommend_destinations))
        .route("/recommend/itinerary", post(recommend_itinerary))
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "TripAI planner is running" }))
}

async fn recommend_destinations(
    State(state): State<Arc<ProxyState>>,
    payload: Result<Json<DestinationRequest>, JsonRejection>,
) -> Result<Json<DestinationEnvelope>, ApiError> {
    let Json(request) = payload?;
    let start_time = Instant::now();
    let mut envelope = state.planner.recommend_destinations(&request).await?;

    if let Some(recommendations) = envelope.recommendations.as_mut() {
        let urls = join_all(recommendations.iter().map(|rec| {
            state
                .images
                .image_for(rec.destination.as_deref().unwrap_or("travel"))
        }))
        .await;

        for (rec, url) in recommendations.iter_mut().zip(urls) {
            rec.image_url = Some(url);
        }
    }

    info!(
        "Served {} destinations in {:.3}s",
        envelope.recommendations.as_ref().map_or(0, Vec::len),
        start_time.elapsed().as_secs_f64()
    );
    Ok(Json(envelope))
}

async fn recommend_itinerary(
    State(state): State<Arc<ProxyState>>,
    payload: Result<Json<ItineraryRequest>, JsonRejection>,
) -> Result<Json<ItineraryEnvelope>, ApiError> {
    let Json(request) = payload?;
    let start_time = Instant::now();
    let envelope = state.planner.recommend_itinerary(&request).await?;
    info!(
        "Served itinerary for '{}' in {:.3}s",
        request.destination,
        start_time.elapsed().as_secs_f64()
    );
    Ok(Json(envelope))
}
