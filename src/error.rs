use std::path::PathBuf;

use thiserror::Error;

/// Problems found while assembling a job, before any upload starts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no series selected")]
    NoSeriesSelected,
    #[error("no default language selected")]
    MissingLanguage,
    #[error("no default framerate selected")]
    MissingFramerate,
    #[error("unknown framerate: {0}")]
    UnknownFramerate(String),
    #[error("no default comment set")]
    MissingComment,
    #[error("no subtitles added")]
    EmptyJob,
    #[error("season/episode unknown for {}", .0.display())]
    MissingEpisodeNumber(PathBuf),
    #[error("job was already started (state: {0:?})")]
    AlreadyStarted(crate::model::RunState),
}

/// A second, different series turned up in a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot add files from a different series (current series: {locked}, new file series: {found})")]
pub struct SeriesConflict {
    pub locked: String,
    pub found: String,
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("missing subdl API token")]
    MissingToken,
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("subdl rejected the request: {0}")]
    Rejected(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("could not read subtitle file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("missing TMDB API key")]
    MissingApiKey,
    #[error("TMDB request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("could not read settings file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
