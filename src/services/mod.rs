use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{SearchError, UploadError};
use crate::model::UploadTask;

pub mod subdl;
pub mod tmdb;

pub use subdl::SubdlClient;
pub use tmdb::TmdbClient;

/// Remote side of an upload. `Ok(false)` means the service answered but did
/// not accept the subtitle.
#[async_trait]
pub trait SubtitleUploadService: Send + Sync {
    async fn upload(&self, task: &UploadTask) -> Result<bool, UploadError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub id: u64,
    pub name: String,
    pub first_air_year: Option<String>,
    pub language: Option<String>,
    pub rating: Option<f64>,
    pub overview: String,
    pub poster_ref: Option<String>,
}

#[async_trait]
pub trait SeriesSearchService: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SeriesSummary>, SearchError>;
}
