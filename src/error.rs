//! Error types for the materials client
//!
//! Library code returns these thiserror enums; binaries wrap them in anyhow.

use thiserror::Error;

/// Message shown when a failure carries no field-level explanation.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong, please try again!";

/// Errors produced by a [`crate::api::MaterialsApi`] implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Material identifier must not be empty")]
    EmptyIdentifier,

    #[error("Invalid request URL: {message}")]
    InvalidUrl { message: String },

    #[error("Network error: {message}")]
    Transport { message: String },

    #[error("Server rejected request with status {status}: {}", .messages.join("; "))]
    Rejected { status: u16, messages: Vec<String> },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Backend unavailable")]
    Unavailable,

    #[error("Request ended without a result")]
    Aborted,
}

impl ApiError {
    /// Build a rejection carrying the server's field messages.
    pub fn rejected(status: u16, messages: impl IntoIterator<Item = impl Into<String>>) -> Self {
        ApiError::Rejected {
            status,
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    /// First field-level message reported by the server, if any
    pub fn first_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { messages, .. } => messages.first().map(String::as_str),
            _ => None,
        }
    }

    /// The string the UI displays for this failure.
    pub fn display_message(&self) -> String {
        self.first_message()
            .unwrap_or(GENERIC_FAILURE_MESSAGE)
            .to_string()
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::Decode {
                message: error.to_string(),
            }
        } else {
            ApiError::Transport {
                message: error.to_string(),
            }
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(error: url::ParseError) -> Self {
        ApiError::InvalidUrl {
            message: error.to_string(),
        }
    }
}

/// Errors raised while turning a raw form value into a field update
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Unknown field '{0}'")]
    UnknownField(String),

    #[error("{field} must be a number")]
    InvalidNumber { field: &'static str },

    #[error("{field} is too large")]
    OutOfRange { field: &'static str },

    #[error("'{value}' is not a valid date")]
    InvalidDate { value: String },
}

/// Errors loading client configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid base URL '{value}': {source}")]
    BaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid timeout '{value}': expected whole seconds")]
    Timeout { value: String },
}
