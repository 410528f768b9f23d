//! Title lookup for providers that search by name rather than by ID.

mod cinemeta;

pub use cinemeta::{CinemetaClient, CinemetaConfig};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when resolving a title.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Resource not found (404 or no metadata in the response).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Resolves an external identifier to a human-readable title.
#[async_trait]
pub trait TitleLookup: Send + Sync {
    /// Title of the movie with the given IMDb ID.
    async fn movie_title(&self, id: &str) -> Result<String, MetadataError>;

    /// Name of the TV series with the given IMDb ID.
    async fn series_title(&self, id: &str) -> Result<String, MetadataError>;
}
