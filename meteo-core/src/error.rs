use thiserror::Error;

use crate::time::TimeLayout;

/// Failures while turning a response body into a [`crate::WeatherResult`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Response body is not valid JSON")]
    InvalidJson(#[source] serde_json::Error),

    // Syntactically valid JSON whose shape drifted from what we expect.
    #[error("Field '{key}' has an unexpected type: expected {expected}")]
    InvalidShape { key: String, expected: &'static str },

    #[error("Malformed timestamp '{text}': expected {layout}")]
    MalformedTimestamp { text: String, layout: TimeLayout },

    #[error(
        "Response contains neither an 'hourly' nor a 'daily' section.\n\
         Hint: request at least one hourly or daily metric."
    )]
    MissingRequiredSection,
}

impl DecodeError {
    /// True for both syntax errors and type mismatches.
    pub fn is_invalid_json(&self) -> bool {
        matches!(self, DecodeError::InvalidJson(_) | DecodeError::InvalidShape { .. })
    }
}

/// Failures of a full request/decode exchange.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}: {body}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("Invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },

    #[error("Invalid request options: {0}")]
    InvalidOptions(String),
}
