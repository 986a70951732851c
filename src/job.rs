use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{ConfigError, SeriesConflict};
use crate::extractor::{ScanEvent, ScanHandle};
use crate::model::{FileRecord, Framerate, UploadJob, UploadTask};
use crate::release_template::ReleaseTemplates;
use crate::series_guard::SeriesGuard;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Added,
    Duplicate,
    Ignored,
}

/// Summary of one scan once all its events have been applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub added: usize,
    pub duplicates: usize,
    pub skipped: Vec<PathBuf>,
    pub conflict: Option<SeriesConflict>,
    pub titles: BTreeSet<String>,
}

/// Records of the job being assembled, owned by the controlling side. The
/// set of tracked paths is only ever touched here.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    records: Vec<FileRecord>,
    added_files: HashSet<PathBuf>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.added_files.contains(path)
    }

    /// Title of the first record, which every other record must share.
    pub fn series_title(&self) -> Option<&str> {
        self.records.first().map(|record| record.series_title.as_str())
    }

    pub fn guard(&self) -> SeriesGuard {
        match self.records.first() {
            Some(record) => SeriesGuard::locked_to(&record.series_key()),
            None => SeriesGuard::unlocked(),
        }
    }

    pub fn apply(&mut self, event: &ScanEvent) -> Applied {
        let ScanEvent::Accepted(record) = event else {
            return Applied::Ignored;
        };

        if !self.added_files.insert(record.path.clone()) {
            return Applied::Duplicate;
        }
        self.records.push(record.clone());
        Applied::Added
    }

    /// Drains a running scan, applying every event in arrival order.
    pub async fn ingest<F>(&mut self, mut handle: ScanHandle, mut on_event: F) -> ScanOutcome
    where
        F: FnMut(&ScanEvent),
    {
        let mut outcome = ScanOutcome::default();

        while let Some(event) = handle.next_event().await {
            on_event(&event);
            match self.apply(&event) {
                Applied::Added => outcome.added += 1,
                Applied::Duplicate => outcome.duplicates += 1,
                Applied::Ignored => {}
            }
            match event {
                ScanEvent::Skipped { path, .. } => outcome.skipped.push(path),
                ScanEvent::Conflict { conflict, .. } => outcome.conflict = Some(conflict),
                ScanEvent::Finished { titles } => {
                    outcome.titles = titles;
                    break;
                }
                _ => {}
            }
        }
        handle.join().await;

        info!(
            "Batch done: {} added, {} already present, {} skipped",
            outcome.added,
            outcome.duplicates,
            outcome.skipped.len()
        );
        outcome
    }

    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.records.len() {
            return false;
        }
        self.records.swap(index - 1, index);
        true
    }

    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.records.len() {
            return false;
        }
        self.records.swap(index, index + 1);
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<FileRecord> {
        if index >= self.records.len() {
            return None;
        }
        let record = self.records.remove(index);
        self.added_files.remove(&record.path);
        Some(record)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.added_files.clear();
    }
}

/// Job-wide values supplied by the caller when the upload is assembled.
#[derive(Debug, Clone, Default)]
pub struct JobSettings {
    pub target_id: Option<u64>,
    pub language_id: String,
    pub framerate: String,
    pub comment: String,
    pub release_templates: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSettings {
    pub target_id: u64,
    pub language_id: String,
    pub framerate: Framerate,
    pub comment: String,
    pub release_templates: Vec<String>,
}

impl JobSettings {
    pub fn validate(&self) -> Result<ValidSettings, ConfigError> {
        let target_id = self.target_id.ok_or(ConfigError::NoSeriesSelected)?;

        let language_id = self.language_id.trim();
        if language_id.is_empty() {
            return Err(ConfigError::MissingLanguage);
        }

        let framerate: Framerate = self.framerate.parse()?;

        if self.comment.trim().is_empty() {
            return Err(ConfigError::MissingComment);
        }

        let release_templates = self
            .release_templates
            .iter()
            .filter(|template| !template.trim().is_empty())
            .cloned()
            .collect();

        Ok(ValidSettings {
            target_id,
            language_id: language_id.to_string(),
            framerate,
            comment: self.comment.clone(),
            release_templates,
        })
    }
}

/// Checks the settings and turns each record into an upload task.
pub fn build_job(
    records: &[FileRecord],
    settings: &JobSettings,
) -> Result<UploadJob, ConfigError> {
    let settings = settings.validate()?;

    if records.is_empty() {
        return Err(ConfigError::EmptyJob);
    }

    let templates = ReleaseTemplates::new();
    let mut tasks = Vec::with_capacity(records.len());

    for record in records {
        let (Some(season), Some(episode)) = (record.season, record.episode) else {
            warn!("No season/episode for {}", record.display_name);
            return Err(ConfigError::MissingEpisodeNumber(record.path.clone()));
        };

        let releases = templates.render(
            season,
            episode,
            &record.display_name,
            &settings.release_templates,
        );

        tasks.push(UploadTask {
            file_path: record.path.clone(),
            target_id: settings.target_id,
            season,
            episode_from: episode,
            episode_to: episode,
            releases,
            language_id: settings.language_id.clone(),
            comment: settings.comment.clone(),
            framerate: settings.framerate,
        });
    }

    Ok(UploadJob::new(tasks))
}
