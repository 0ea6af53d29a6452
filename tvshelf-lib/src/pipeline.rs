//! Sequential scan scheduler.
//!
//! Jobs are kept in an append-only list with a cursor pointing at the next
//! one to run. A single worker thread advances the cursor; every other call
//! only touches the list under a short-held lock and never waits on the
//! network. Jobs whose match is ambiguous are parked as `uncertain` and the
//! worker moves on; callers settle them later with
//! [`ScanPipeline::resolve_uncertain`] or [`ScanPipeline::skip_uncertain`].

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Utc;
use tvshelf_catalog::types::MatchedShow;
use tvshelf_db::MetadataStore;
use tvshelf_scraper::{CatalogService, PosterCache, RateLimiter, ShowMatcher, ThrottledCatalog};

use crate::error::{panic_message, PipelineError, ScanError};
use crate::events::{EventBus, ScanEvent, SubscriptionId};
use crate::job::{JobStatus, ScanJob, ScanStats};
use crate::processor::{folder_name, JobOutcome, JobProcessor};
use crate::scanner::extension_set;
use crate::settings::PipelineOptions;

/// How long [`ScanPipeline::reset`] waits for the worker to finish its
/// current job before detaching it.
const RESET_WAIT: Duration = Duration::from_secs(5);
const RESET_POLL: Duration = Duration::from_millis(10);

pub struct ScanPipeline {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    state: Mutex<PipelineState>,
    processor: JobProcessor,
    events: Arc<EventBus>,
}

#[derive(Default)]
struct PipelineState {
    jobs: Vec<ScanJob>,
    /// Index of the next job to run.
    cursor: usize,
    running: bool,
    /// Bumped on reset. Workers and resolutions from an older generation
    /// leave the state alone.
    generation: u64,
    next_job_id: u64,
    /// Stop flag of the current worker.
    cancel: Arc<AtomicBool>,
    /// Raised by reset. Work claimed in this generation checks it before
    /// every catalog search and store write, so a detached worker or
    /// resolution leaves the store alone.
    abandoned: Arc<AtomicBool>,
}

enum NextStep {
    Run { id: u64, folder: PathBuf, silent: bool },
    Finish { drained: bool, stats: ScanStats },
    Abandon,
}

/// A resolution running in the background.
pub struct Resolution {
    folder: PathBuf,
    handle: JoinHandle<Result<MatchedShow, ScanError>>,
}

impl Resolution {
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the hierarchy is stored and the job is settled.
    pub fn wait(self) -> Result<MatchedShow, PipelineError> {
        let result = self
            .handle
            .join()
            .map_err(|_| PipelineError::WorkerPanicked)?;
        Ok(result?)
    }
}

impl ScanPipeline {
    /// Build a pipeline around a catalog and a store. All catalog calls,
    /// from the worker and from resolutions, share one rate limiter.
    pub fn new<C>(catalog: C, store: Arc<MetadataStore>, options: PipelineOptions) -> Self
    where
        C: CatalogService + 'static,
    {
        let limiter = Arc::new(RateLimiter::new(options.request_interval));
        let catalog: Arc<dyn CatalogService> = Arc::new(ThrottledCatalog::new(catalog, limiter));
        let events = Arc::new(EventBus::new());

        let processor = JobProcessor {
            catalog,
            store,
            matcher: ShowMatcher::new(options.require_exact_match),
            extensions: extension_set(&options.video_extensions),
            posters: options.poster_cache_dir.map(PosterCache::new),
            events: events.clone(),
        };

        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PipelineState::default()),
                processor,
                events,
            }),
            worker: Mutex::new(None),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&ScanEvent) + Send + Sync + 'static,
    {
        self.shared.events.subscribe(listener)
    }

    pub fn store(&self) -> &Arc<MetadataStore> {
        &self.shared.processor.store
    }

    fn worker_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.worker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ── Control ─────────────────────────────────────────────────────────────

    /// Queue a folder. Does not start the worker. Returns the job id.
    ///
    /// Fails if the folder already has a pending, running, or parked job.
    pub fn add_job(&self, folder: impl Into<PathBuf>, silent: bool) -> Result<u64, PipelineError> {
        let folder = folder.into();
        let mut state = self.shared.lock();
        if state
            .jobs
            .iter()
            .any(|j| j.folder_path == folder && j.status.is_active())
        {
            return Err(PipelineError::DuplicateJob(folder));
        }

        let id = state.next_job_id;
        state.next_job_id += 1;
        log::debug!("Queued job {} for {}", id, folder.display());
        state.jobs.push(ScanJob::new(id, folder, silent));
        Ok(id)
    }

    /// Spawn the worker. It picks up at the first job not yet run.
    pub fn start(&self) -> Result<(), PipelineError> {
        let (generation, cancel, abandoned) = {
            let mut state = self.shared.lock();
            if state.running {
                return Err(PipelineError::AlreadyRunning);
            }
            if state.jobs.is_empty() {
                return Err(PipelineError::NoJobs);
            }
            state.running = true;
            state.cancel = Arc::new(AtomicBool::new(false));
            (state.generation, state.cancel.clone(), state.abandoned.clone())
        };

        let shared = self.shared.clone();
        let spawned = thread::Builder::new()
            .name("tvshelf-scan".to_string())
            .spawn(move || run_worker(shared, generation, cancel, abandoned));

        match spawned {
            Ok(handle) => {
                *self.worker_slot() = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.lock().running = false;
                Err(PipelineError::WorkerSpawn(e))
            }
        }
    }

    /// Ask the worker to exit after its current job.
    pub fn stop(&self) {
        let state = self.shared.lock();
        if state.running {
            log::info!("Stop requested; finishing current job");
        }
        state.cancel.store(true, Ordering::SeqCst);
    }

    /// Stop the worker and forget every job.
    ///
    /// Waits a bounded time for an in-flight job; a worker still busy after
    /// that is detached. Detached work and in-flight resolutions may finish a
    /// catalog call already under way, but write nothing to the store.
    pub fn reset(&self) {
        {
            let state = self.shared.lock();
            state.cancel.store(true, Ordering::SeqCst);
            state.abandoned.store(true, Ordering::SeqCst);
        }

        let handle = self.worker_slot().take();
        if let Some(handle) = handle {
            let deadline = Instant::now() + RESET_WAIT;
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(RESET_POLL);
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                log::warn!("Scan worker still busy after {:?}; detaching it", RESET_WAIT);
            }
        }

        let mut state = self.shared.lock();
        state.jobs.clear();
        state.cursor = 0;
        state.running = false;
        state.generation += 1;
        state.abandoned = Arc::new(AtomicBool::new(false));
    }

    /// Block until the current worker exits.
    pub fn wait(&self) {
        let handle = self.worker_slot().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                log::error!("Scan worker panicked");
            }
        }
    }

    // ── Uncertain matches ───────────────────────────────────────────────────

    /// Settle a parked job with the chosen show.
    ///
    /// The job is claimed before this returns; catalog and storage work runs
    /// on its own thread. Fails with [`PipelineError::JobNotFound`] if the
    /// folder has no `uncertain` job, leaving everything untouched.
    pub fn resolve_uncertain(
        &self,
        folder: &Path,
        show: MatchedShow,
    ) -> Result<Resolution, PipelineError> {
        let (id, generation, abandoned) = {
            let mut state = self.shared.lock();
            let generation = state.generation;
            let abandoned = state.abandoned.clone();
            let job = state
                .jobs
                .iter_mut()
                .find(|j| j.folder_path == folder && j.status == JobStatus::Uncertain)
                .ok_or_else(|| PipelineError::JobNotFound(folder.to_path_buf()))?;
            job.status = JobStatus::Scanning;
            (job.id, generation, abandoned)
        };

        let shared = self.shared.clone();
        let target = folder.to_path_buf();
        let spawned = thread::Builder::new()
            .name("tvshelf-resolve".to_string())
            .spawn(move || shared.run_resolution(id, generation, &abandoned, target, show));

        match spawned {
            Ok(handle) => Ok(Resolution {
                folder: folder.to_path_buf(),
                handle,
            }),
            Err(e) => {
                if let Some(job) = self.shared.lock().job_mut(id) {
                    job.status = JobStatus::Uncertain;
                }
                Err(PipelineError::WorkerSpawn(e))
            }
        }
    }

    /// Settle a parked job with no match. Writes nothing to the store.
    pub fn skip_uncertain(&self, folder: &Path) -> Result<(), PipelineError> {
        let stats = {
            let mut state = self.shared.lock();
            let job = state
                .jobs
                .iter_mut()
                .find(|j| j.folder_path == folder && j.status == JobStatus::Uncertain)
                .ok_or_else(|| PipelineError::JobNotFound(folder.to_path_buf()))?;
            job.status = JobStatus::Complete;
            job.result = None;
            job.candidates.clear();
            job.ended_at = Some(Utc::now());
            ScanStats::from_jobs(&state.jobs)
        };

        log::info!("[SKIPPED] {}", folder_name(folder));
        self.shared.events.emit(ScanEvent::JobCompleted {
            folder: folder.to_path_buf(),
            show: None,
        });
        self.shared.events.emit(ScanEvent::ScanStats(stats));
        Ok(())
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    /// Snapshot of every job in the order added.
    pub fn jobs(&self) -> Vec<ScanJob> {
        self.shared.lock().jobs.clone()
    }

    /// The most recent job for a folder.
    pub fn job(&self, folder: &Path) -> Option<ScanJob> {
        self.shared
            .lock()
            .jobs
            .iter()
            .rev()
            .find(|j| j.folder_path == folder)
            .cloned()
    }

    pub fn uncertain_jobs(&self) -> Vec<ScanJob> {
        self.shared
            .lock()
            .jobs
            .iter()
            .filter(|j| j.status == JobStatus::Uncertain)
            .cloned()
            .collect()
    }

    pub fn stats(&self) -> ScanStats {
        ScanStats::from_jobs(&self.shared.lock().jobs)
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }
}

impl Drop for ScanPipeline {
    fn drop(&mut self) {
        self.shared.lock().cancel.store(true, Ordering::SeqCst);
    }
}

// ── Worker ──────────────────────────────────────────────────────────────────

fn run_worker(
    shared: Arc<Shared>,
    generation: u64,
    cancel: Arc<AtomicBool>,
    abandoned: Arc<AtomicBool>,
) {
    log::debug!("Scan worker started");
    loop {
        match shared.next_step(generation, &cancel) {
            NextStep::Run { id, folder, silent } => {
                log::info!("[JOB START] {}", folder.display());
                shared.events.emit(ScanEvent::JobStarted {
                    folder: folder.clone(),
                });
                let result = catch_job_panic(|| {
                    shared.processor.process_job(&folder, silent, &abandoned)
                });
                shared.finish_job(id, generation, &folder, result);
            }
            NextStep::Finish { drained, stats } => {
                if drained {
                    log::info!(
                        "All jobs complete: {} total, {} done, {} error(s)",
                        stats.total,
                        stats.completed,
                        stats.errors
                    );
                    shared.events.emit(ScanEvent::AllJobsComplete);
                } else {
                    log::info!("Scan stopped");
                }
                shared.events.emit(ScanEvent::ScanStats(stats));
                return;
            }
            NextStep::Abandon => return,
        }
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PipelineState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Claim the next job, or decide the worker is done.
    fn next_step(&self, generation: u64, cancel: &AtomicBool) -> NextStep {
        let mut state = self.lock();
        if state.generation != generation {
            return NextStep::Abandon;
        }

        let drained = state.cursor >= state.jobs.len();
        if drained || cancel.load(Ordering::SeqCst) {
            state.running = false;
            return NextStep::Finish {
                drained,
                stats: ScanStats::from_jobs(&state.jobs),
            };
        }

        let index = state.cursor;
        state.cursor += 1;
        let job = &mut state.jobs[index];
        job.status = JobStatus::Scanning;
        job.started_at = Some(Utc::now());
        NextStep::Run {
            id: job.id,
            folder: job.folder_path.clone(),
            silent: job.silent,
        }
    }

    /// Record a job's outcome and announce it.
    fn finish_job(
        &self,
        id: u64,
        generation: u64,
        folder: &Path,
        result: Result<JobOutcome, ScanError>,
    ) {
        if matches!(result, Err(ScanError::Abandoned)) {
            log::debug!("Discarded job for {} after reset", folder.display());
            return;
        }

        let event = {
            let mut state = self.lock();
            if state.generation != generation {
                return;
            }
            let Some(job) = state.job_mut(id) else {
                return;
            };
            job.ended_at = Some(Utc::now());

            match result {
                Ok(JobOutcome::Complete(show)) => {
                    job.status = JobStatus::Complete;
                    job.result = show.clone();
                    ScanEvent::JobCompleted {
                        folder: folder.to_path_buf(),
                        show,
                    }
                }
                Ok(JobOutcome::Uncertain(candidates)) => {
                    job.status = JobStatus::Uncertain;
                    job.candidates = candidates.clone();
                    ScanEvent::JobUncertain {
                        folder: folder.to_path_buf(),
                        candidates,
                    }
                }
                Err(e) => {
                    let message = e.to_string();
                    log::error!("[JOB ERROR] {}: {}", folder.display(), message);
                    job.status = JobStatus::Error;
                    job.error_message = Some(message.clone());
                    ScanEvent::JobError {
                        folder: folder.to_path_buf(),
                        message,
                    }
                }
            }
        };
        self.events.emit(event);
    }

    /// Body of a resolution thread.
    fn run_resolution(
        &self,
        id: u64,
        generation: u64,
        abandoned: &AtomicBool,
        folder: PathBuf,
        show: MatchedShow,
    ) -> Result<MatchedShow, ScanError> {
        let result = catch_job_panic(|| {
            let videos = self.processor.videos_in(&folder)?;
            self.processor.store_show(&folder, &show, &videos, abandoned)
        });
        if matches!(result, Err(ScanError::Abandoned)) {
            log::debug!("Discarded resolution for {} after reset", folder.display());
            return result.map(|()| show);
        }

        let (event, stats) = {
            let mut state = self.lock();
            if state.generation != generation {
                return result.map(|()| show);
            }
            let Some(job) = state.job_mut(id) else {
                return result.map(|()| show);
            };
            job.ended_at = Some(Utc::now());
            job.candidates.clear();

            let event = match &result {
                Ok(()) => {
                    log::info!("[RESOLVED] {} -> {}", folder_name(&folder), show.name);
                    job.status = JobStatus::Complete;
                    job.result = Some(show.clone());
                    ScanEvent::JobCompleted {
                        folder: folder.clone(),
                        show: Some(show.clone()),
                    }
                }
                Err(e) => {
                    let message = e.to_string();
                    log::error!("[JOB ERROR] {}: {}", folder.display(), message);
                    job.status = JobStatus::Error;
                    job.error_message = Some(message.clone());
                    ScanEvent::JobError {
                        folder: folder.clone(),
                        message,
                    }
                }
            };
            (event, ScanStats::from_jobs(&state.jobs))
        };

        self.events.emit(event);
        self.events.emit(ScanEvent::ScanStats(stats));
        result.map(|()| show)
    }
}

/// Run job work, turning a panic into a job error so the worker survives.
fn catch_job_panic<T>(work: impl FnOnce() -> Result<T, ScanError>) -> Result<T, ScanError> {
    panic::catch_unwind(AssertUnwindSafe(work))
        .unwrap_or_else(|payload| Err(ScanError::Panicked(panic_message(payload.as_ref()))))
}

impl PipelineState {
    fn job_mut(&mut self, id: u64) -> Option<&mut ScanJob> {
        self.jobs.iter_mut().find(|j| j.id == id)
    }
}
