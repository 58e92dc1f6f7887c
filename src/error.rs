//! Error type for the indicator client.
//!
//! The public fetch operations collapse every variant into `None` / an empty list
//! and log the reason; the `try_*` variants hand the error to the caller.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid proxy url {url}: {source}")]
    Proxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("request failed with HTTP {status} ({url})")]
    Status { status: u16, url: String },

    #[error("decode json: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    Shape(String),

    /// The API reported an error object in place of the metadata element.
    #[error("world bank api error: {0}")]
    Api(String),

    #[error("no {indicator} data for {country}")]
    NoData { indicator: String, country: String },

    #[error("page limit exceeded ({0})")]
    PageLimit(u32),

    #[error("config {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

impl ApiError {
    /// True for failures that say nothing about the data itself (transport and status errors).
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. })
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
