use reqwest::StatusCode;
use thiserror::Error;

// Everything that stops an audit run. Failing policy checks are outcomes, not errors.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("listing {url} returned {status}")]
    Listing { url: String, status: StatusCode },

    #[error("failed to decode repositories from {url}: {source}")]
    Decoding {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}
