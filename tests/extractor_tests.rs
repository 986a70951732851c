// Integration tests for the batch extractor and the record set it feeds

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use subdl_batch::error::SeriesConflict;
use subdl_batch::extractor::{Extractor, ScanEvent, collect_subtitle_files};
use subdl_batch::guesser::FilenameGuesser;
use subdl_batch::job::{RecordSet, ScanOutcome};

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, "1\n00:00:01,000 --> 00:00:02,000\nHello\n").unwrap();
    path
}

fn extractor() -> Extractor {
    Extractor::new(Arc::new(FilenameGuesser::new()))
}

async fn scan(records: &mut RecordSet, paths: Vec<PathBuf>) -> (ScanOutcome, Vec<ScanEvent>) {
    let handle = extractor().spawn(paths, records.guard());
    let mut events = Vec::new();
    let outcome = records.ingest(handle, |event| events.push(event.clone())).await;
    (outcome, events)
}

#[test]
fn test_collect_expands_directories_and_filters_extensions() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "Show.S01E01.srt");
    touch(dir.path(), "Show.S01E02.SRT");
    touch(dir.path(), "notes.txt");
    touch(dir.path(), "Show.S01E04.mkv");
    touch(dir.path(), "sub/Show.S01E03.ass");
    let direct = touch(dir.path(), "Show.S01E05.sup");
    let ignored = dir.path().join("notes.txt");

    let files = collect_subtitle_files(&[dir.path().to_path_buf(), direct.clone(), ignored]);
    let names: Vec<String> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();

    assert_eq!(
        names,
        vec![
            "Show.S01E01.srt",
            "Show.S01E02.SRT",
            "Show.S01E05.sup",
            "Show.S01E03.ass",
            "Show.S01E05.sup",
        ]
    );
}

#[cfg(unix)]
#[test]
fn test_collect_follows_symlinked_files() {
    let store = tempfile::tempdir().unwrap();
    let target = touch(store.path(), "Show.S01E07.srt");

    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "Show.S01E06.srt");
    std::os::unix::fs::symlink(&target, dir.path().join("Show.S01E07.srt")).unwrap();

    let files = collect_subtitle_files(&[dir.path().to_path_buf()]);
    assert_eq!(
        files,
        vec![dir.path().join("Show.S01E06.srt"), dir.path().join("Show.S01E07.srt")]
    );
}

#[test]
fn test_collect_skips_missing_paths() {
    let files = collect_subtitle_files(&[PathBuf::from("/definitely/not/here.srt")]);
    assert!(files.is_empty());
}

#[tokio::test]
async fn test_one_series_in_any_order_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        touch(dir.path(), "Show.S01E03.srt"),
        touch(dir.path(), "show.S01E01.srt"),
        touch(dir.path(), "SHOW.S01E02.ass"),
    ];

    let mut records = RecordSet::new();
    let (outcome, events) = scan(&mut records, paths).await;

    assert_eq!(outcome.added, 3);
    assert_eq!(outcome.conflict, None);
    assert_eq!(outcome.titles.into_iter().collect::<Vec<_>>(), vec!["show"]);
    assert_eq!(records.len(), 3);
    assert_eq!(records.guard().locked_title(), Some("show"));

    // Progress events come in file order, one per file, and end with Finished.
    let progress: Vec<String> = events
        .iter()
        .filter_map(|event| match event {
            ScanEvent::Progress { file_name, .. } => Some(file_name.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(progress, vec!["Show.S01E03.srt", "show.S01E01.srt", "SHOW.S01E02.ass"]);
    assert!(matches!(events.last(), Some(ScanEvent::Finished { .. })));
}

#[tokio::test]
async fn test_different_series_stops_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        touch(dir.path(), "Show.S01E01.srt"),
        touch(dir.path(), "Other.Show.S01E01.srt"),
        touch(dir.path(), "Show.S01E02.srt"),
    ];

    let mut records = RecordSet::new();
    let (outcome, events) = scan(&mut records, paths).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records.records()[0].display_name, "Show.S01E01.srt");
    assert_eq!(
        outcome.conflict,
        Some(SeriesConflict {
            locked: "show".to_string(),
            found: "other show".to_string(),
        })
    );
    assert_eq!(
        outcome.titles.into_iter().collect::<Vec<_>>(),
        vec!["other show", "show"]
    );

    // Nothing after the conflicting file was looked at.
    let examined = events
        .iter()
        .filter(|event| matches!(event, ScanEvent::Progress { .. }))
        .count();
    assert_eq!(examined, 2);
}

#[tokio::test]
async fn test_later_batch_is_checked_against_locked_series() {
    let dir = tempfile::tempdir().unwrap();
    let mut records = RecordSet::new();

    scan(&mut records, vec![touch(dir.path(), "Show.S01E01.srt")]).await;
    let (outcome, _) = scan(&mut records, vec![touch(dir.path(), "Another.S01E01.srt")]).await;

    assert_eq!(outcome.added, 0);
    assert!(outcome.conflict.is_some());
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_resubmitting_paths_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        touch(dir.path(), "Show.S01E01.srt"),
        touch(dir.path(), "Show.S01E02.srt"),
    ];

    let mut records = RecordSet::new();
    scan(&mut records, paths.clone()).await;
    let (outcome, _) = scan(&mut records, paths).await;

    assert_eq!(outcome.added, 0);
    assert_eq!(outcome.duplicates, 2);
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_files_without_title_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        touch(dir.path(), "S01E05.srt"),
        touch(dir.path(), "Show.S01E06.srt"),
    ];

    let mut records = RecordSet::new();
    let (outcome, _) = scan(&mut records, paths).await;

    assert_eq!(outcome.skipped.len(), 1);
    assert_eq!(outcome.added, 1);
    assert_eq!(records.records()[0].season, Some(1));
    assert_eq!(records.records()[0].episode, Some(6));
}
