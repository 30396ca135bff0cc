//! Error types and handling for the travel planner service

use axum::http::StatusCode;
use thiserror::Error;

use crate::model::ModelError;

/// Main error type for the travel planner service
#[derive(Error, Debug)]
pub enum TravelPlannerError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Missing or empty request fields
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A lookup produced no usable result
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Language model communication errors
    #[error("Upstream model error: {source}")]
    Upstream {
        #[from]
        source: ModelError,
    },

    /// Request body over the server's size limit
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
}

impl TravelPlannerError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// HTTP status this error maps to at the API boundary
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            TravelPlannerError::Validation { .. } => StatusCode::BAD_REQUEST,
            TravelPlannerError::NotFound { .. } => StatusCode::NOT_FOUND,
            TravelPlannerError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            TravelPlannerError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            TravelPlannerError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message.
    ///
    /// Validation and not-found messages are written for clients and pass
    /// through; everything else is replaced with a generic sentence so that
    /// provider responses and internal details stay in the logs.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelPlannerError::Validation { message } | TravelPlannerError::NotFound { message } => {
                message.clone()
            }
            TravelPlannerError::Upstream { source } => match source {
                ModelError::RateLimited => {
                    "The language model is busy right now. Please try again in a moment."
                        .to_string()
                }
                ModelError::ContentFiltered => {
                    "The language model declined to answer this request.".to_string()
                }
                _ => "Unable to get a response from the language model. Please try again later."
                    .to_string(),
            },
            TravelPlannerError::Config { .. } => {
                "The service is misconfigured. Please contact the administrator.".to_string()
            }
            TravelPlannerError::PayloadTooLarge { .. } => "Request body is too large".to_string(),
        }
    }
}
