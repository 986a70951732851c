use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use super::{SeriesSearchService, SeriesSummary};
use crate::error::SearchError;

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<TvResult>,
}

#[derive(Debug, Deserialize)]
struct TvResult {
    id: u64,
    name: String,
    first_air_date: Option<String>,
    original_language: Option<String>,
    vote_average: Option<f64>,
    #[serde(default)]
    overview: String,
    poster_path: Option<String>,
}

impl From<TvResult> for SeriesSummary {
    fn from(result: TvResult) -> Self {
        let first_air_year = result
            .first_air_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string);

        SeriesSummary {
            id: result.id,
            name: result.name,
            first_air_year,
            language: result.original_language,
            rating: result.vote_average,
            overview: result.overview,
            poster_ref: result.poster_path,
        }
    }
}

pub struct TmdbClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: Option<String>, base_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SeriesSearchService for TmdbClient {
    async fn search(&self, query: &str) -> Result<Vec<SeriesSummary>, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Searching TMDB for {:?}", query);
        let response = self
            .client
            .get(format!("{}/search/tv", self.base_url))
            .bearer_auth(api_key)
            .header("accept", "application/json")
            .query(&[
                ("query", query),
                ("include_adult", "false"),
                ("language", "en-US"),
                ("page", "1"),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response.json().await?;
        Ok(body.results.into_iter().map(SeriesSummary::from).collect())
    }
}
