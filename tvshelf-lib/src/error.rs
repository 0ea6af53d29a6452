use std::path::PathBuf;

use thiserror::Error;
use tvshelf_db::OperationError;
use tvshelf_scraper::CatalogError;

/// Errors that fail a single scan job.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Storage error: {0}")]
    Persistence(#[from] OperationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Job panicked: {0}")]
    Panicked(String),

    #[error("Scan was reset; results discarded")]
    Abandoned,
}

/// Errors returned by the pipeline's control surface.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("A scan is already running")]
    AlreadyRunning,

    #[error("No jobs have been added")]
    NoJobs,

    #[error("No uncertain job for {}", .0.display())]
    JobNotFound(PathBuf),

    #[error("A job for {} is already queued", .0.display())]
    DuplicateJob(PathBuf),

    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    #[error("Resolution failed: {0}")]
    Resolution(#[from] ScanError),

    #[error("Worker thread panicked")]
    WorkerPanicked,
}

/// Errors loading or saving the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
