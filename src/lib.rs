//! `TripAI` - AI travel planning
//!
//! This library provides the trip planning session state machine, the
//! preference collector, the recommendation client boundary and the
//! presenter that turns a session into screens.

pub mod api;
pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod planner;
pub mod presenter;
pub mod session;
pub mod web;

// Re-export core types for public API
pub use collector::PreferenceForm;
pub use config::TripAiConfig;
pub use error::{TransitionError, TripAiError};
pub use models::{Enrichment, TravelPreferences, TripId, TripRecommendation};
pub use planner::{RecommendationClient, create_client};
pub use presenter::View;
pub use session::{AppStep, Controller, Session};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripAiError>;
