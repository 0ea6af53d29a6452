//! Scan pipeline for TV show libraries.
//!
//! Walks library folders, identifies each show through a catalog service,
//! stores the show/season/episode hierarchy and links video files to
//! episodes. Used by the CLI; all types are frontend-agnostic.

pub mod classifier;
pub mod error;
pub mod events;
pub mod job;
pub mod pipeline;
mod processor;
pub mod scanner;
pub mod settings;

pub use classifier::{classify_folder, discover_show_folders, FolderKind, ShowFolder};
pub use error::{PipelineError, ScanError, SettingsError};
pub use events::{EventBus, JobStage, ScanEvent, SubscriptionId};
pub use job::{JobStatus, ScanJob, ScanStats};
pub use pipeline::{Resolution, ScanPipeline};
pub use scanner::{extension_set, find_video_files, DEFAULT_VIDEO_EXTENSIONS};
pub use settings::{PipelineOptions, Settings};
