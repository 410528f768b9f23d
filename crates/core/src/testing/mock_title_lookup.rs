//! Mock title lookup for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::metadata::{MetadataError, TitleLookup};

/// A recorded title lookup for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedLookup {
    Movie { id: String },
    Series { id: String },
}

/// Mock implementation of the TitleLookup trait.
///
/// Unknown IDs produce `MetadataError::NotFound`.
#[derive(Debug, Default)]
pub struct MockTitleLookup {
    movies: RwLock<HashMap<String, String>>,
    series: RwLock<HashMap<String, String>>,
    lookups: RwLock<Vec<RecordedLookup>>,
    /// If set, the next lookup will fail with this error.
    next_error: RwLock<Option<MetadataError>>,
}

impl MockTitleLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a movie title.
    pub fn with_movie(mut self, id: &str, title: &str) -> Self {
        self.movies
            .get_mut()
            .insert(id.to_string(), title.to_string());
        self
    }

    /// Register a series name.
    pub fn with_series(mut self, id: &str, name: &str) -> Self {
        self.series
            .get_mut()
            .insert(id.to_string(), name.to_string());
        self
    }

    /// Configure the next lookup to fail with the given error.
    pub async fn set_next_error(&self, error: MetadataError) {
        *self.next_error.write().await = Some(error);
    }

    /// Lookups made so far.
    pub async fn recorded_lookups(&self) -> Vec<RecordedLookup> {
        self.lookups.read().await.clone()
    }
}

#[async_trait]
impl TitleLookup for MockTitleLookup {
    async fn movie_title(&self, id: &str) -> Result<String, MetadataError> {
        self.lookups
            .write()
            .await
            .push(RecordedLookup::Movie { id: id.to_string() });
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        self.movies
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| MetadataError::NotFound(format!("movie {}", id)))
    }

    async fn series_title(&self, id: &str) -> Result<String, MetadataError> {
        self.lookups
            .write()
            .await
            .push(RecordedLookup::Series { id: id.to_string() });
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }
        self.series
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| MetadataError::NotFound(format!("series {}", id)))
    }
}
