//! Trip recommendation model and itinerary data

use std::fmt;

use chrono::Utc;
use rand::RngExt;
use serde::{Deserialize, Serialize};

/// Opaque client-side identifier of a recommendation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripId(String);

impl TripId {
    /// Generate a fresh id for the recommendation at `index` in a result list
    #[must_use]
    pub fn generate(index: usize) -> Self {
        let salt: u32 = rand::rng().random_range(0..0x1_0000);
        Self(format!(
            "trip-{index}-{}-{salt:04x}",
            Utc::now().timestamp_millis()
        ))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TripId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A candidate trip proposed by the planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripRecommendation {
    pub id: TripId,
    pub destination: String,
    pub country: String,
    pub short_description: String,
    pub reason_for_recommendation: String,
    /// Already formatted in the requested currency
    pub estimated_total_cost: String,
    pub flight_suggestion: String,
    pub hotel_suggestion: String,
    /// Empty until the trip is enriched
    pub itinerary: Vec<ItineraryDay>,
    pub attractions: Vec<Attraction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl TripRecommendation {
    /// Whether the day-by-day itinerary has already been fetched
    #[must_use]
    pub fn is_enriched(&self) -> bool {
        !self.itinerary.is_empty()
    }

    /// Copy of this trip carrying the fetched itinerary; the id is preserved
    #[must_use]
    pub fn enriched(&self, enrichment: Enrichment) -> Self {
        Self {
            itinerary: enrichment.itinerary,
            attractions: enrichment.attractions,
            ..self.clone()
        }
    }
}

/// One day of an itinerary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryDay {
    /// 1-based
    pub day: u32,
    pub theme: String,
    pub activities: Vec<ItineraryActivity>,
}

/// A single scheduled activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryActivity {
    /// Free-form label such as "오전 10:00" or "Evening"
    pub time: String,
    pub activity: String,
    pub description: String,
}

/// A named point of interest at the destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attraction {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Itinerary data attached to a trip after the user selects it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Enrichment {
    pub itinerary: Vec<ItineraryDay>,
    pub attractions: Vec<Attraction>,
}
