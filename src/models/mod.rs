//! Data models for the TripAI application
//!
//! This module contains the core domain models organized by concern:
//! - Preferences: the validated trip constraints a user submits
//! - Trip: recommended destinations and their day-by-day itineraries

pub mod preferences;
pub mod trip;

// Re-export all public types for convenient access
pub use preferences::{CompanionType, Currency, TravelPreferences, TripDuration};
pub use trip::{
    Attraction, Enrichment, ItineraryActivity, ItineraryDay, TripId, TripRecommendation,
};
