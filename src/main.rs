use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use log::warn;

use subdl_batch::config::{Overrides, Settings, default_settings_path};
use subdl_batch::extractor::{Extractor, ScanEvent};
use subdl_batch::guesser::FilenameGuesser;
use subdl_batch::job::{RecordSet, ScanOutcome, build_job};
use subdl_batch::logging;
use subdl_batch::model::RunState;
use subdl_batch::pipeline::{PipelineControl, PipelineEvent, TaskStatus, UploadPipeline};
use subdl_batch::services::{SeriesSearchService, SubdlClient, TmdbClient};

#[derive(Parser)]
#[command(name = "subdl-batch", version, about = "Batch subtitle uploader for one TV series")]
struct Cli {
    /// Settings file (read only)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Detect season/episode/series for subtitle files and directories
    Scan {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Search TMDB for a series
    Search { query: String },
    /// Scan, then upload every file of the detected series
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// TMDB id of the series; looked up from the detected title if omitted
        #[arg(long)]
        tmdb_id: Option<u64>,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        framerate: Option<String>,
        #[arg(long)]
        comment: Option<String>,
        /// Release template, e.g. "Show.S00E00.1080p.WEB-DL" (repeatable)
        #[arg(long = "template")]
        templates: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("✗ Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<bool> {
    let settings_path = cli.settings.unwrap_or_else(default_settings_path);
    let settings = Settings::load(&settings_path).context("Failed to load settings")?;

    match cli.command {
        Command::Scan { paths } => {
            let mut records = RecordSet::new();
            let outcome = scan_into(&mut records, paths).await;
            print_records(&records);
            Ok(outcome.conflict.is_none())
        }
        Command::Search { query } => {
            let tmdb = TmdbClient::new(settings.tmdb_key());
            let results = tmdb.search(&query).await.context("TMDB search failed")?;
            if results.is_empty() {
                println!("No results found for '{}'", query);
            }
            for show in results {
                println!(
                    "{:>8}  {} ({})  ★ {:.1}",
                    show.id,
                    show.name,
                    show.first_air_year.as_deref().unwrap_or("N/A"),
                    show.rating.unwrap_or(0.0)
                );
            }
            Ok(true)
        }
        Command::Upload {
            paths,
            tmdb_id,
            language,
            framerate,
            comment,
            templates,
        } => {
            let mut records = RecordSet::new();
            scan_into(&mut records, paths).await;
            if records.is_empty() {
                bail!("No subtitles added");
            }
            print_records(&records);

            let target_id = match tmdb_id {
                Some(id) => id,
                None => auto_select_series(&settings, &records).await?,
            };

            let overrides = Overrides {
                language,
                framerate,
                comment,
                templates,
            };
            let job_settings = overrides.apply(settings.job_settings(Some(target_id)));
            let job = build_job(records.records(), &job_settings).context("Cannot start upload")?;

            let service = Arc::new(SubdlClient::new(settings.subdl_token()));
            let pipeline = UploadPipeline::new(service);
            let mut handle = pipeline.start(job).context("Cannot start upload")?;
            let total = records.len();

            println!("Uploading subtitles... (p = pause, r = resume, c = cancel)");
            let control = handle.control();
            std::thread::spawn(move || read_commands(control));

            while let Some(event) = handle.next_event().await {
                match event {
                    PipelineEvent::Task { index, status } => {
                        let name = &records.records()[index].display_name;
                        let position = index + 1;
                        match status {
                            TaskStatus::Processing => {
                                println!("[{}/{}] {} (Processing...)", position, total, name)
                            }
                            TaskStatus::Completed => {
                                println!("[{}/{}] {} (Completed ✓)", position, total, name)
                            }
                            TaskStatus::Failed(reason) => println!(
                                "[{}/{}] {} (Failed ✗: {})",
                                position, total, name, reason
                            ),
                        }
                    }
                    PipelineEvent::Finished { success, state } => {
                        if success {
                            println!("✓ All subtitles uploaded successfully!");
                        } else if state == RunState::Cancelled {
                            println!("⚠ Upload cancelled.");
                        } else {
                            println!("✗ Some files failed to upload.");
                        }
                    }
                }
            }

            let state = handle.wait().await;
            Ok(state == RunState::Completed)
        }
    }
}

async fn scan_into(records: &mut RecordSet, paths: Vec<PathBuf>) -> ScanOutcome {
    let extractor = Extractor::new(Arc::new(FilenameGuesser::new()));
    let handle = extractor.spawn(paths, records.guard());

    let outcome = records
        .ingest(handle, |event| match event {
            ScanEvent::Progress { file_name, percent } => {
                println!("[{:>3}%] Processing: {}", percent, file_name)
            }
            ScanEvent::Skipped { path, reason } => {
                println!("ℹ Skipped {}: {}", path.display(), reason)
            }
            ScanEvent::Conflict { conflict, .. } => {
                println!("⚠ Different series detected!");
                println!("  Current series: {}", conflict.locked);
                println!("  New file series: {}", conflict.found);
            }
            _ => {}
        })
        .await;

    println!(
        "Found {} new file(s), {} already added, {} skipped",
        outcome.added,
        outcome.duplicates,
        outcome.skipped.len()
    );
    outcome
}

fn print_records(records: &RecordSet) {
    println!("{:<8} {:<8} {:<30} File", "Season", "Episode", "Series");
    for record in records.records() {
        let season = record.season.map(|s| s.to_string()).unwrap_or_default();
        let episode = record.episode.map(|e| e.to_string()).unwrap_or_default();
        println!(
            "{:<8} {:<8} {:<30} {}",
            season, episode, record.series_title, record.display_name
        );
    }
}

async fn auto_select_series(settings: &Settings, records: &RecordSet) -> Result<u64> {
    let Some(title) = records.series_title() else {
        bail!("No series detected");
    };

    let tmdb = TmdbClient::new(settings.tmdb_key());
    let results = tmdb
        .search(title)
        .await
        .with_context(|| format!("Could not look up '{}' on TMDB; pass --tmdb-id", title))?;

    let Some(show) = results.into_iter().next() else {
        bail!("No TMDB results for '{}'; pass --tmdb-id", title);
    };
    println!("Selected Series: {} (TMDB ID: {})", show.name, show.id);
    Ok(show.id)
}

fn read_commands(control: PipelineControl) {
    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Could not read from stdin: {}", e);
                break;
            }
        };

        match line.trim() {
            "p" => {
                if control.pause() {
                    println!("⏸ Paused, the current file will finish first");
                }
            }
            "r" => {
                if control.resume() {
                    println!("▶ Resumed");
                }
            }
            "c" => {
                if control.cancel() {
                    println!("⏹ Cancelling after the current file");
                }
            }
            "" => {}
            other => println!("Unknown command '{}' (p = pause, r = resume, c = cancel)", other),
        }

        if control.state().is_terminal() {
            break;
        }
    }
}
