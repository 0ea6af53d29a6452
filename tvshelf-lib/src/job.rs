use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tvshelf_catalog::types::MatchedShow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Scanning,
    Complete,
    Error,
    /// Parked until resolved or skipped.
    Uncertain,
}

impl JobStatus {
    /// Not yet complete or failed. At most one active job per folder.
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Scanning | JobStatus::Uncertain)
    }

    /// Counted as done in [`ScanStats`]. Parked jobs count: the worker is
    /// finished with them.
    pub fn is_finished(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Error | JobStatus::Uncertain)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobStatus::Pending => "pending",
            JobStatus::Scanning => "scanning",
            JobStatus::Complete => "complete",
            JobStatus::Error => "error",
            JobStatus::Uncertain => "uncertain",
        };
        f.write_str(label)
    }
}

/// One scheduled scan of a single folder.
#[derive(Debug, Clone, Serialize)]
pub struct ScanJob {
    pub id: u64,
    pub folder_path: PathBuf,
    /// Do not surface ambiguous matches; treat them as no match.
    pub silent: bool,
    pub status: JobStatus,
    pub result: Option<MatchedShow>,
    /// Candidates offered while the job is uncertain.
    pub candidates: Vec<MatchedShow>,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ScanJob {
    pub(crate) fn new(id: u64, folder_path: PathBuf, silent: bool) -> Self {
        Self {
            id,
            folder_path,
            silent,
            status: JobStatus::Pending,
            result: None,
            candidates: Vec::new(),
            error_message: None,
            started_at: None,
            ended_at: None,
        }
    }

    /// The folder's own name, used as the catalog query.
    pub fn folder_name(&self) -> String {
        crate::processor::folder_name(&self.folder_path)
    }
}

/// Scan health counters. `errors <= completed <= total` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub total: usize,
    /// Jobs the worker is done with, parked ones included.
    pub completed: usize,
    pub errors: usize,
}

impl ScanStats {
    pub fn from_jobs(jobs: &[ScanJob]) -> Self {
        Self {
            total: jobs.len(),
            completed: jobs.iter().filter(|j| j.status.is_finished()).count(),
            errors: jobs.iter().filter(|j| j.status == JobStatus::Error).count(),
        }
    }
}
