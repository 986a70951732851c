//! Batch subtitle uploads for a single TV series.
//!
//! Files are scanned into [`job::RecordSet`] by the [`extractor`], which keeps a
//! batch on one series through [`series_guard::SeriesGuard`]. Records plus
//! [`job::JobSettings`] become an [`model::UploadJob`], and the
//! [`pipeline::UploadPipeline`] uploads its tasks one at a time with
//! pause/resume/cancel.

pub mod config;
pub mod error;
pub mod extractor;
pub mod guesser;
pub mod job;
pub mod logging;
pub mod model;
pub mod pipeline;
pub mod release_template;
pub mod series_guard;
pub mod services;

pub use error::{ConfigError, SeriesConflict, UploadError};
pub use extractor::{Extractor, ScanEvent};
pub use guesser::{FilenameGuesser, MetadataGuesser};
pub use job::{JobSettings, RecordSet, build_job};
pub use model::{FileRecord, Framerate, RunState, UploadJob, UploadTask};
pub use pipeline::{Control, PipelineEvent, TaskStatus, UploadPipeline};
pub use release_template::render_releases;
pub use series_guard::SeriesGuard;
