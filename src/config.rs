use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use crate::error::SettingsError;
use crate::job::JobSettings;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Values read from the settings file. The file is only ever read.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tmdb_api_key: String,
    pub subdl_api_key: String,
    pub default_language: Option<String>,
    pub default_framerate: String,
    pub default_comment: String,
    #[serde(rename = "releases_template")]
    pub release_templates: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tmdb_api_key: String::new(),
            subdl_api_key: String::new(),
            default_language: Some("EN".to_string()),
            default_framerate: "23.976".to_string(),
            default_comment: String::new(),
            release_templates: Vec::new(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No settings file at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(SettingsError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let settings = serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn subdl_token(&self) -> Option<String> {
        non_blank(&self.subdl_api_key)
    }

    pub fn tmdb_key(&self) -> Option<String> {
        non_blank(&self.tmdb_api_key)
    }

    /// The job-level values the core needs, taken from these settings.
    pub fn job_settings(&self, target_id: Option<u64>) -> JobSettings {
        JobSettings {
            target_id,
            language_id: self.default_language.clone().unwrap_or_default(),
            framerate: self.default_framerate.clone(),
            comment: self.default_comment.clone(),
            release_templates: self.release_templates.clone(),
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() { None } else { Some(value.to_string()) }
}

/// Per-run overrides, typically from the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub language: Option<String>,
    pub framerate: Option<String>,
    pub comment: Option<String>,
    pub templates: Vec<String>,
}

impl Overrides {
    pub fn apply(self, mut settings: JobSettings) -> JobSettings {
        if let Some(language) = self.language {
            settings.language_id = language;
        }
        if let Some(framerate) = self.framerate {
            settings.framerate = framerate;
        }
        if let Some(comment) = self.comment {
            settings.comment = comment;
        }
        if !self.templates.is_empty() {
            settings.release_templates = self.templates;
        }
        settings
    }
}

pub fn default_settings_path() -> PathBuf {
    PathBuf::from(DEFAULT_SETTINGS_FILE)
}
