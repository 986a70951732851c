use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::ConfigError;

pub const SUBTITLE_EXTENSIONS: [&str; 3] = ["srt", "sup", "ass"];

pub fn is_subtitle_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUBTITLE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// One subtitle file found by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub display_name: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub series_title: String,
}

impl FileRecord {
    /// Lowercased, trimmed title, the key records are compared by.
    pub fn series_key(&self) -> String {
        crate::series_guard::normalize(&self.series_title)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framerate {
    Unspecified,
    Fps23_976,
    Fps23_980,
    Fps24,
    Fps25,
    Fps29_970,
    Fps30,
}

impl Framerate {
    const TABLE: [(&'static str, Framerate, u8); 7] = [
        ("0", Framerate::Unspecified, 0),
        ("23.976", Framerate::Fps23_976, 2),
        ("23.980", Framerate::Fps23_980, 6),
        ("24.000", Framerate::Fps24, 5),
        ("25.000", Framerate::Fps25, 3),
        ("29.970", Framerate::Fps29_970, 4),
        ("30.000", Framerate::Fps30, 7),
    ];

    pub fn all() -> impl Iterator<Item = Framerate> {
        Self::TABLE.iter().map(|(_, rate, _)| *rate)
    }

    /// Numeric code subdl expects in the `framerate` form field.
    pub fn code(self) -> u8 {
        Self::TABLE
            .iter()
            .find(|(_, rate, _)| *rate == self)
            .map(|(_, _, code)| *code)
            .unwrap_or(0)
    }

    pub fn label(self) -> &'static str {
        Self::TABLE
            .iter()
            .find(|(_, rate, _)| *rate == self)
            .map(|(label, _, _)| *label)
            .unwrap_or("0")
    }
}

impl FromStr for Framerate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        if label.is_empty() {
            return Err(ConfigError::MissingFramerate);
        }
        Self::TABLE
            .iter()
            .find(|(known, _, _)| *known == label)
            .map(|(_, rate, _)| *rate)
            .ok_or_else(|| ConfigError::UnknownFramerate(label.to_string()))
    }
}

impl fmt::Display for Framerate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fully resolved unit of upload work. Built once per record at job start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub file_path: PathBuf,
    pub target_id: u64,
    pub season: u32,
    pub episode_from: u32,
    pub episode_to: u32,
    pub releases: Vec<String>,
    pub language_id: String,
    pub comment: String,
    pub framerate: Framerate,
}

impl UploadTask {
    pub fn file_name(&self) -> String {
        self.file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    Idle,
    Running,
    Paused,
    Cancelled,
    Completed,
    Failed,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Cancelled | RunState::Completed | RunState::Failed)
    }
}

#[derive(Debug, Clone)]
pub struct UploadJob {
    tasks: Vec<UploadTask>,
    state: RunState,
}

impl UploadJob {
    pub fn new(tasks: Vec<UploadTask>) -> Self {
        Self {
            tasks,
            state: RunState::Idle,
        }
    }

    pub fn tasks(&self) -> &[UploadTask] {
        &self.tasks
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub(crate) fn set_state(&mut self, state: RunState) {
        self.state = state;
    }
}
