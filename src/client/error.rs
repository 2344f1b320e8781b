use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum NewsApiError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Network error: {0}")]
    Network(#[source] BoxError),

    #[error("Failed to decode response: {0}")]
    Decoding(String),

    #[error("No data received")]
    NoData,

    #[error("API rate limit exceeded. Please try again later.")]
    RateLimitExceeded,

    #[error("Invalid API key")]
    ApiKeyInvalid,
}

impl NewsApiError {
    pub fn network<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        NewsApiError::Network(err.into())
    }
}

impl From<url::ParseError> for NewsApiError {
    fn from(err: url::ParseError) -> Self {
        NewsApiError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for NewsApiError {
    fn from(err: serde_json::Error) -> Self {
        NewsApiError::Decoding(err.to_string())
    }
}
