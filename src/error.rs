use std::fmt;
use thiserror::Error;

/// Failures while fetching or normalizing source content.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The input could not be parsed as a URL
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Network failure or timeout
    #[error("Failed to fetch {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-2xx status
    #[error("Fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Response body was not what the source format promises
    #[error("Malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    /// Response parsed but the expected data node is absent
    #[error("Response from {url} is missing `{node}`")]
    MissingData { url: String, node: &'static str },

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Reasons a service response cannot be turned into a [`crate::Recipe`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Expected a JSON object, got {0}")]
    NotAnObject(String),

    #[error("Missing required field `{0}`")]
    MissingField(String),

    #[error("Invalid value for `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Unknown measurement unit `{unit}` for ingredient `{ingredient}`")]
    InvalidUnit { ingredient: String, unit: String },

    #[error("Non-numeric quantity `{quantity}` for ingredient `{ingredient}`")]
    InvalidQuantity { ingredient: String, quantity: String },

    #[error("Instruction {index} has no usable step number: {reason}")]
    InvalidStep { index: usize, reason: String },
}

/// Failures of the extraction stage.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The service explicitly declined to answer
    #[error("Extraction service refused: {0}")]
    Refusal(String),

    /// The service call itself failed (network, timeout, API error)
    #[error("Extraction service failed: {0}")]
    Service(String),

    /// The service answered but not with a JSON object
    #[error("Extraction service returned an unreadable response: {0}")]
    InvalidResponse(String),

    /// The returned object does not satisfy the recipe schema
    #[error("Extracted recipe failed validation: {0}")]
    Validation(#[from] ValidationError),

    /// No usable provider configuration
    #[error("Extraction provider not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        ExtractionError::Service(err.to_string())
    }
}

impl From<serde_json::Error> for ExtractionError {
    fn from(err: serde_json::Error) -> Self {
        ExtractionError::InvalidResponse(err.to_string())
    }
}

/// Pipeline stage a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Setup,
    Acquisition,
    Extraction,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::Acquisition => "acquisition",
            Stage::Extraction => "extraction",
        };
        f.write_str(name)
    }
}

/// Terminal error of a recipe extraction.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("acquisition stage failed: {0}")]
    Acquisition(#[from] AcquisitionError),

    #[error("extraction stage failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Provider or HTTP clients could not be set up
    #[error("setup failed: {0}")]
    Setup(String),
}

impl PipelineError {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::Acquisition(_) => Stage::Acquisition,
            PipelineError::Extraction(_) => Stage::Extraction,
            PipelineError::Config(_) | PipelineError::Setup(_) => Stage::Setup,
        }
    }

    pub fn is_refusal(&self) -> bool {
        matches!(self, PipelineError::Extraction(ExtractionError::Refusal(_)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_of_errors() {
        let err = PipelineError::from(AcquisitionError::Status {
            url: "https://example.com".to_string(),
            status: 404,
        });
        assert_eq!(err.stage(), Stage::Acquisition);
        assert!(err.to_string().contains("HTTP 404"));

        let err = PipelineError::from(ExtractionError::Refusal("not a recipe".to_string()));
        assert_eq!(err.stage(), Stage::Extraction);
        assert!(err.is_refusal());

        let err = PipelineError::Setup("no provider".to_string());
        assert_eq!(err.stage(), Stage::Setup);
    }

    #[test]
    fn test_validation_error_wraps_into_extraction() {
        let err: ExtractionError = ValidationError::MissingField("title".to_string()).into();
        assert!(matches!(err, ExtractionError::Validation(_)));
        assert!(err.to_string().contains("`title`"));
    }
}
