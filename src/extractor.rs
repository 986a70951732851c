use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use walkdir::WalkDir;

use crate::error::SeriesConflict;
use crate::guesser::MetadataGuesser;
use crate::model::{FileRecord, is_subtitle_file};
use crate::series_guard::{GuardDecision, SeriesGuard, normalize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Progress { file_name: String, percent: u8 },
    Accepted(FileRecord),
    Skipped { path: PathBuf, reason: String },
    Conflict { path: PathBuf, conflict: SeriesConflict },
    /// Always the last event of a scan. Titles are lowercased.
    Finished { titles: BTreeSet<String> },
}

/// Expands directories recursively and keeps only subtitle files, preserving
/// argument order. Directory contents are sorted by file name.
pub fn collect_subtitle_files<P: AsRef<Path>>(paths: &[P]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if path.is_dir() {
            let entries = WalkDir::new(path)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!("Skipping unreadable entry under {}: {}", path.display(), e);
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file() && is_subtitle_file(entry.path()))
                .map(|entry| entry.into_path());
            files.extend(entries);
        } else if path.is_file() {
            if is_subtitle_file(path) {
                files.push(path.to_path_buf());
            } else {
                debug!("Ignoring non-subtitle file {}", path.display());
            }
        } else {
            warn!("Path does not exist: {}", path.display());
        }
    }

    files
}

fn absolute_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

pub struct Extractor {
    guesser: Arc<dyn MetadataGuesser>,
}

impl Extractor {
    pub fn new(guesser: Arc<dyn MetadataGuesser>) -> Self {
        Self { guesser }
    }

    /// Guesses metadata for each file in order and runs it past the guard.
    /// Stops at the first file from another series; records accepted before
    /// it stay accepted.
    pub fn scan<F>(&self, files: &[PathBuf], mut guard: SeriesGuard, mut emit: F)
    where
        F: FnMut(ScanEvent),
    {
        let total = files.len();
        let mut titles = BTreeSet::new();

        for (index, path) in files.iter().enumerate() {
            let display_name = path
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default();

            let percent = ((index * 100) / total.max(1)) as u8;
            emit(ScanEvent::Progress {
                file_name: display_name.clone(),
                percent,
            });

            let guess = self.guesser.guess(&display_name);
            let Some(title) = guess.title else {
                warn!("No title found in {}, skipping", display_name);
                emit(ScanEvent::Skipped {
                    path: path.clone(),
                    reason: "no series title found in file name".to_string(),
                });
                continue;
            };
            debug!(
                "{} -> title {:?}, season {:?}, episode {:?}",
                display_name, title, guess.season, guess.episode
            );

            titles.insert(normalize(&title));

            match guard.check(&title) {
                GuardDecision::Conflict(conflict) => {
                    warn!("{}", conflict);
                    titles.insert(conflict.locked.clone());
                    emit(ScanEvent::Conflict {
                        path: path.clone(),
                        conflict,
                    });
                    break;
                }
                GuardDecision::Lock => guard.lock(&title),
                GuardDecision::Accept => {}
            }

            emit(ScanEvent::Accepted(FileRecord {
                path: absolute_path(path),
                display_name,
                season: guess.season,
                episode: guess.episode,
                series_title: title,
            }));
        }

        info!("Scanned {} file(s), series seen: {:?}", total, titles);
        emit(ScanEvent::Finished { titles });
    }

    /// Runs path expansion and the scan on a blocking worker thread.
    pub fn spawn(self, paths: Vec<PathBuf>, guard: SeriesGuard) -> ScanHandle {
        let (tx, rx) = mpsc::unbounded_channel();

        let join = tokio::task::spawn_blocking(move || {
            let files = collect_subtitle_files(&paths);
            info!("Processing {} subtitle file(s)...", files.len());
            self.scan(&files, guard, |event| {
                // The receiver may already be gone; nothing left to report to.
                let _ = tx.send(event);
            });
        });

        ScanHandle { events: rx, join }
    }
}

pub struct ScanHandle {
    events: mpsc::UnboundedReceiver<ScanEvent>,
    join: JoinHandle<()>,
}

impl ScanHandle {
    pub async fn next_event(&mut self) -> Option<ScanEvent> {
        self.events.recv().await
    }

    pub async fn join(self) {
        if let Err(e) = self.join.await {
            warn!("Scan worker ended abnormally: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guesser::Guess;

    struct FixedGuesser;

    impl MetadataGuesser for FixedGuesser {
        fn guess(&self, filename: &str) -> Guess {
            let title = filename.split('-').next().filter(|t| !t.is_empty()).map(str::to_string);
            Guess {
                title,
                season: Some(1),
                episode: Some(1),
            }
        }
    }

    #[test]
    fn test_progress_percentages() {
        let extractor = Extractor::new(Arc::new(FixedGuesser));
        let files: Vec<PathBuf> = ["a-1.srt", "a-2.srt", "a-3.srt", "a-4.srt"]
            .iter()
            .map(PathBuf::from)
            .collect();

        let mut percents = Vec::new();
        extractor.scan(&files, SeriesGuard::unlocked(), |event| {
            if let ScanEvent::Progress { percent, .. } = event {
                percents.push(percent);
            }
        });

        assert_eq!(percents, vec![0, 25, 50, 75]);
    }

    #[test]
    fn test_empty_batch_still_finishes() {
        let extractor = Extractor::new(Arc::new(FixedGuesser));
        let mut events = Vec::new();
        extractor.scan(&[], SeriesGuard::unlocked(), |event| events.push(event));
        assert_eq!(
            events,
            vec![ScanEvent::Finished {
                titles: BTreeSet::new()
            }]
        );
    }
}
