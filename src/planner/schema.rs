//! Wire records exchanged with the planner
//!
//! Every response field is optional on the wire. Records are validated into
//! domain types before anything reaches the session; a missing required field
//! is a schema error.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{
    Attraction, Enrichment, ItineraryActivity, ItineraryDay, TravelPreferences, TripId,
    TripRecommendation,
};
use crate::{Result, TripAiError};

/// Body of `POST /recommend/destinations`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationRequest {
    /// Preferences serialized as a JSON string
    pub preferences: String,
    pub duration: String,
    pub budget: String,
}

impl DestinationRequest {
    pub fn from_preferences(prefs: &TravelPreferences) -> Result<Self> {
        Ok(Self {
            preferences: serde_json::to_string(prefs)?,
            duration: prefs.date_range_label(),
            budget: prefs.budget_label(),
        })
    }
}

/// Body of `POST /recommend/itinerary`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryRequest {
    pub destination: String,
    /// Preferences serialized as a JSON string
    pub preferences: String,
    pub duration: String,
}

impl ItineraryRequest {
    pub fn from_preferences(destination: &str, prefs: &TravelPreferences) -> Result<Self> {
        Ok(Self {
            destination: destination.to_string(),
            preferences: serde_json::to_string(prefs)?,
            duration: prefs.date_range_label(),
        })
    }
}

/// Response of a destination query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DestinationEnvelope {
    pub recommendations: Option<Vec<RawRecommendation>>,
}

/// Response of an itinerary query
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItineraryEnvelope {
    pub itinerary: Option<Vec<RawDay>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attractions: Option<Vec<RawAttraction>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecommendation {
    pub destination: Option<String>,
    pub country: Option<String>,
    pub short_description: Option<String>,
    pub reason_for_recommendation: Option<String>,
    pub estimated_total_cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub itinerary: Option<Vec<RawDay>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attractions: Option<Vec<RawAttraction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDay {
    pub day: Option<u32>,
    pub theme: Option<String>,
    pub activities: Option<Vec<RawActivity>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawActivity {
    pub time: Option<String>,
    pub activity: Option<String>,
    pub description: Option<String>,
}

/// Planners return attractions either as bare names or as objects
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAttraction {
    Name(String),
    Detailed {
        name: String,
        #[serde(default)]
        description: Option<String>,
    },
}

fn required(value: Option<String>, field: &str, context: &str) -> Result<String> {
    value
        .ok_or_else(|| TripAiError::schema(format!("{context}: missing required field '{field}'")))
}

impl DestinationEnvelope {
    /// Validate every candidate and assign fresh client-side ids.
    ///
    /// Candidates come back without itinerary data even when the planner sent
    /// some; itineraries are fetched on selection.
    pub fn into_recommendations(self) -> Result<Vec<TripRecommendation>> {
        let raw = self.recommendations.ok_or_else(|| {
            TripAiError::schema("destination response is missing 'recommendations'")
        })?;

        raw.into_iter()
            .enumerate()
            .map(|(index, rec)| rec.validate(index))
            .collect()
    }
}

impl RawRecommendation {
    fn validate(self, index: usize) -> Result<TripRecommendation> {
        let context = format!("recommendation #{}", index + 1);
        let destination = required(self.destination, "destination", &context)?;
        let country = required(self.country, "country", &context)?;
        let short_description = required(self.short_description, "shortDescription", &context)?;
        let reason_for_recommendation = required(
            self.reason_for_recommendation,
            "reasonForRecommendation",
            &context,
        )?;
        let estimated_total_cost =
            required(self.estimated_total_cost, "estimatedTotalCost", &context)?;

        if self.itinerary.as_ref().is_some_and(|days| !days.is_empty()) {
            warn!(
                "Dropping inline itinerary for '{}'; it is fetched on selection",
                destination
            );
        }

        Ok(TripRecommendation {
            id: TripId::generate(index),
            destination,
            country,
            short_description,
            reason_for_recommendation,
            estimated_total_cost,
            flight_suggestion: self.flight_suggestion.unwrap_or_default(),
            hotel_suggestion: self.hotel_suggestion.unwrap_or_default(),
            itinerary: Vec::new(),
            attractions: Vec::new(),
            image_url: self.image_url.filter(|url| !url.is_empty()),
        })
    }
}

impl ItineraryEnvelope {
    /// Validate the itinerary response. An empty itinerary is rejected so that
    /// an enriched trip always has something to show.
    pub fn into_enrichment(self) -> Result<Enrichment> {
        let days = self
            .itinerary
            .ok_or_else(|| TripAiError::schema("itinerary response is missing 'itinerary'"))?;

        if days.is_empty() {
            return Err(TripAiError::schema("planner returned an empty itinerary"));
        }

        let itinerary = days
            .into_iter()
            .enumerate()
            .map(|(index, day)| day.validate(index))
            .collect::<Result<Vec<_>>>()?;

        let attractions = self
            .attractions
            .unwrap_or_default()
            .into_iter()
            .map(Attraction::from)
            .filter(|a| !a.name.trim().is_empty())
            .collect();

        Ok(Enrichment {
            itinerary,
            attractions,
        })
    }
}

impl RawDay {
    fn validate(self, index: usize) -> Result<ItineraryDay> {
        let position = u32::try_from(index + 1).unwrap_or(u32::MAX);
        let day = match self.day {
            Some(0) => {
                return Err(TripAiError::schema(format!(
                    "itinerary entry #{position} has day number 0"
                )));
            }
            Some(day) => day,
            None => position,
        };

        let context = format!("day {day}");
        let activities = self
            .activities
            .unwrap_or_default()
            .into_iter()
            .map(|activity| activity.validate(&context))
            .collect::<Result<Vec<_>>>()?;

        Ok(ItineraryDay {
            day,
            theme: self.theme.unwrap_or_default(),
            activities,
        })
    }
}

impl RawActivity {
    fn validate(self, context: &str) -> Result<ItineraryActivity> {
        Ok(ItineraryActivity {
            time: self.time.unwrap_or_default(),
            activity: required(self.activity, "activity", context)?,
            description: self.description.unwrap_or_default(),
        })
    }
}

impl From<RawAttraction> for Attraction {
    fn from(raw: RawAttraction) -> Self {
        match raw {
            RawAttraction::Name(name) => Attraction {
                name,
                description: None,
            },
            RawAttraction::Detailed { name, description } => Attraction { name, description },
        }
    }
}
