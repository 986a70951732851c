// Integration tests for job assembly and pre-flight validation

use std::path::PathBuf;

use subdl_batch::error::ConfigError;
use subdl_batch::job::{JobSettings, build_job};
use subdl_batch::model::{FileRecord, Framerate, RunState};

fn record(name: &str, season: Option<u32>, episode: Option<u32>) -> FileRecord {
    FileRecord {
        path: PathBuf::from("/subs").join(name),
        display_name: name.to_string(),
        season,
        episode,
        series_title: "Show".to_string(),
    }
}

fn settings() -> JobSettings {
    JobSettings {
        target_id: Some(1396),
        language_id: "EN".to_string(),
        framerate: "23.976".to_string(),
        comment: "Synced for WEB-DL".to_string(),
        release_templates: vec!["Show.S00E00.1080p.WEB-DL".to_string(), "".to_string()],
    }
}

#[test]
fn test_builds_one_task_per_record() {
    let records = vec![
        record("Show.S01E01.srt", Some(1), Some(1)),
        record("Show.S01E105.srt", Some(1), Some(105)),
    ];

    let job = build_job(&records, &settings()).unwrap();
    assert_eq!(job.state(), RunState::Idle);
    assert_eq!(job.len(), 2);

    let task = &job.tasks()[1];
    assert_eq!(task.file_path, PathBuf::from("/subs/Show.S01E105.srt"));
    assert_eq!(task.target_id, 1396);
    assert_eq!(task.season, 1);
    assert_eq!(task.episode_from, 105);
    assert_eq!(task.episode_to, 105);
    assert_eq!(task.releases, vec!["Show.S01E105.1080p.WEB-DL"]);
    assert_eq!(task.language_id, "EN");
    assert_eq!(task.framerate, Framerate::Fps23_976);
    assert_eq!(task.framerate.code(), 2);
}

#[test]
fn test_no_templates_uses_file_name() {
    let mut settings = settings();
    settings.release_templates.clear();

    let job = build_job(&[record("Show.S02E03.srt", Some(2), Some(3))], &settings).unwrap();
    assert_eq!(job.tasks()[0].releases, vec!["Show.S02E03.srt"]);
}

#[test]
fn test_missing_settings_are_rejected() {
    let records = vec![record("Show.S01E01.srt", Some(1), Some(1))];

    let mut missing_language = settings();
    missing_language.language_id = "  ".to_string();
    assert_eq!(build_job(&records, &missing_language).unwrap_err(), ConfigError::MissingLanguage);

    let mut missing_framerate = settings();
    missing_framerate.framerate.clear();
    assert_eq!(build_job(&records, &missing_framerate).unwrap_err(), ConfigError::MissingFramerate);

    let mut unknown_framerate = settings();
    unknown_framerate.framerate = "59.940".to_string();
    assert_eq!(
        build_job(&records, &unknown_framerate).unwrap_err(),
        ConfigError::UnknownFramerate("59.940".to_string())
    );

    let mut missing_comment = settings();
    missing_comment.comment = "\n".to_string();
    assert_eq!(build_job(&records, &missing_comment).unwrap_err(), ConfigError::MissingComment);

    let mut no_series = settings();
    no_series.target_id = None;
    assert_eq!(build_job(&records, &no_series).unwrap_err(), ConfigError::NoSeriesSelected);
}

#[test]
fn test_empty_and_incomplete_records_are_rejected() {
    assert_eq!(build_job(&[], &settings()).unwrap_err(), ConfigError::EmptyJob);

    let records = vec![
        record("Show.S01E01.srt", Some(1), Some(1)),
        record("Show - 05.srt", None, Some(5)),
    ];
    assert_eq!(
        build_job(&records, &settings()).unwrap_err(),
        ConfigError::MissingEpisodeNumber(PathBuf::from("/subs/Show - 05.srt"))
    );
}
