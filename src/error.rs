//! Error types and handling for the `TripAI` application

use thiserror::Error;

/// Main error type for the `TripAI` application
#[derive(Error, Debug)]
pub enum TripAiError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The planner could not be reached or answered with a non-success status
    #[error("Network error: {message}")]
    Network { message: String },

    /// The planner answered, but the payload is malformed or lacks required fields
    #[error("Schema error: {message}")]
    Schema { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// State machine rejected an intent
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Rejections raised by the session state machine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {intent} while on the {step} screen")]
    InvalidTransition { intent: &'static str, step: String },

    #[error("no trip with id '{0}' in the current recommendations")]
    UnknownTrip(String),

    #[error("completion for request #{ticket} arrived after the session moved on")]
    StaleCompletion { ticket: u64 },
}

impl TripAiError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new schema error
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the error came from a call to the external planner
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        matches!(self, TripAiError::Network { .. } | TripAiError::Schema { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TripAiError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            TripAiError::Network { .. } => {
                "Unable to reach the travel planner. Please check your connection and try again."
                    .to_string()
            }
            TripAiError::Schema { .. } => {
                "The travel planner returned an unexpected answer. Please try again.".to_string()
            }
            TripAiError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            TripAiError::Transition(err) => err.to_string(),
            TripAiError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for TripAiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TripAiError::schema(err.to_string())
        } else {
            TripAiError::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TripAiError {
    fn from(err: serde_json::Error) -> Self {
        TripAiError::schema(err.to_string())
    }
}
