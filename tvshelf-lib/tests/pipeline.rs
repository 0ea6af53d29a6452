use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tvshelf_catalog::types::*;
use tvshelf_db::MetadataStore;
use tvshelf_lib::*;
use tvshelf_scraper::{CatalogError, CatalogService};

// ── Fake catalog ────────────────────────────────────────────────────────────

struct FakeShow {
    candidate: ShowCandidate,
    seasons: Vec<(CatalogSeason, Vec<CatalogEpisode>)>,
}

#[derive(Default)]
struct FakeCatalog {
    shows: Vec<FakeShow>,
    search_delay: Option<Duration>,
    fail_search: bool,
    panic_search_for: Option<&'static str>,
    fail_seasons_for: Option<i64>,
    searches: AtomicUsize,
    season_lists: AtomicUsize,
    episode_lists: AtomicUsize,
    downloads: AtomicUsize,
}

impl FakeCatalog {
    fn with_show(mut self, id: i64, name: &str, episodes_per_season: &[u32]) -> Self {
        let seasons = episodes_per_season
            .iter()
            .enumerate()
            .map(|(i, count)| {
                let number = i as u32 + 1;
                let season = CatalogSeason {
                    season_id: id * 100 + i64::from(number),
                    number,
                    poster_url: Some(format!("http://img/{id}/{number}.jpg")),
                };
                let episodes = (1..=*count)
                    .map(|n| CatalogEpisode {
                        number: n,
                        name: format!("{name} {number}x{n}"),
                        airdate: None,
                        summary: None,
                        poster_url: None,
                    })
                    .collect();
                (season, episodes)
            })
            .collect();
        self.shows.push(FakeShow {
            candidate: ShowCandidate {
                external_id: id,
                name: name.to_string(),
                kind: Some("Scripted".to_string()),
                poster_url: Some(format!("http://img/{id}.jpg")),
            },
            seasons,
        });
        self
    }

    fn standard() -> Self {
        FakeCatalog::default()
            .with_show(169, "Breaking Bad", &[2, 1])
            .with_show(305, "Black Mirror", &[3])
    }

    fn searches(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    fn season_lists(&self) -> usize {
        self.season_lists.load(Ordering::SeqCst)
    }
}

impl CatalogService for FakeCatalog {
    fn search_shows(&self, name: &str) -> Result<Vec<ShowCandidate>, CatalogError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        if self.panic_search_for == Some(name) {
            panic!("search blew up for {name}");
        }
        if let Some(delay) = self.search_delay {
            std::thread::sleep(delay);
        }
        if self.fail_search {
            return Err(CatalogError::Status {
                status: 503,
                url: "http://catalog/search".to_string(),
            });
        }
        Ok(self.shows.iter().map(|s| s.candidate.clone()).collect())
    }

    fn list_seasons(&self, external_id: i64) -> Result<Vec<CatalogSeason>, CatalogError> {
        self.season_lists.fetch_add(1, Ordering::SeqCst);
        if self.fail_seasons_for == Some(external_id) {
            return Err(CatalogError::Timeout);
        }
        Ok(self
            .shows
            .iter()
            .filter(|s| s.candidate.external_id == external_id)
            .flat_map(|s| s.seasons.iter().map(|(season, _)| season.clone()))
            .collect())
    }

    fn list_episodes(&self, season_id: i64) -> Result<Vec<CatalogEpisode>, CatalogError> {
        self.episode_lists.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .shows
            .iter()
            .flat_map(|s| s.seasons.iter())
            .filter(|(season, _)| season.season_id == season_id)
            .flat_map(|(_, episodes)| episodes.clone())
            .collect())
    }

    fn download_image(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(url.as_bytes().to_vec())
    }
}

// ── Harness ─────────────────────────────────────────────────────────────────

struct Harness {
    pipeline: ScanPipeline,
    catalog: Arc<FakeCatalog>,
    store: Arc<MetadataStore>,
    events: Receiver<ScanEvent>,
    dir: TempDir,
}

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"").unwrap();
}

/// A library with one folder per scenario.
fn build_library(root: &Path) {
    touch(root, "Breaking Bad/Breaking.Bad.S01E01.mkv");
    touch(root, "Breaking Bad/Breaking.Bad.S01E02.mkv");
    touch(root, "Breaking Bad/Breaking.Bad.S02E01.mp4");
    touch(root, "Mirror Black/Mirror.Black.S01E01.mkv");
    touch(root, "Season 2/x.S02E01.mkv");
    touch(root, "Empty Show/notes.txt");
    touch(root, "Library/Show A/a.mkv");
    touch(root, "Library/Show B/b.mkv");
    touch(root, "Library/Show C/c.mkv");
}

fn harness_with(catalog: FakeCatalog, options: PipelineOptions) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    build_library(dir.path());
    let catalog = Arc::new(catalog);
    let store = Arc::new(MetadataStore::open_memory().unwrap());
    let pipeline = ScanPipeline::new(catalog.clone(), store.clone(), options);
    let (_id, events) = pipeline.events().subscribe_channel();
    Harness {
        pipeline,
        catalog,
        store,
        events,
        dir,
    }
}

fn fast_options() -> PipelineOptions {
    PipelineOptions {
        request_interval: Duration::from_millis(1),
        ..PipelineOptions::default()
    }
}

fn harness(catalog: FakeCatalog) -> Harness {
    harness_with(catalog, fast_options())
}

impl Harness {
    fn folder(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn add(&self, name: &str, silent: bool) -> PathBuf {
        let folder = self.folder(name);
        self.pipeline.add_job(folder.clone(), silent).unwrap();
        folder
    }

    /// Start the worker, wait for it to exit, and return the events it sent.
    fn run(&self) -> Vec<ScanEvent> {
        self.pipeline.start().unwrap();
        self.pipeline.wait();
        self.drain()
    }

    fn drain(&self) -> Vec<ScanEvent> {
        self.events.try_iter().collect()
    }

    fn job(&self, folder: &Path) -> ScanJob {
        self.pipeline.job(folder).unwrap()
    }
}

fn count_uncertain(events: &[ScanEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ScanEvent::JobUncertain { .. }))
        .count()
}

// ── Matching ────────────────────────────────────────────────────────────────

#[test]
fn exact_match_is_accepted_and_videos_linked() {
    let h = harness(FakeCatalog::standard());
    let folder = h.add("Breaking Bad", false);
    let events = h.run();

    let job = h.job(&folder);
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.result.as_ref().map(|s| s.external_id), Some(169));
    assert!(job.started_at.is_some() && job.ended_at.is_some());
    assert_eq!(count_uncertain(&events), 0);
    assert_eq!(h.catalog.searches(), 1);

    let counts = h.store.counts().unwrap();
    assert_eq!(counts.shows, 1);
    assert_eq!(counts.seasons, 2);
    assert_eq!(counts.episodes, 3);
    assert_eq!(counts.videos, 3);
    assert_eq!(counts.linked_videos, 3);

    let video = folder.join("Breaking.Bad.S02E01.mp4");
    let row = h
        .store
        .get_video_by_path(&video.to_string_lossy())
        .unwrap()
        .unwrap();
    let show = h.store.get_show_by_external_id(169).unwrap().unwrap();
    let episode = h
        .store
        .get_episode_by_season_and_number(show.id, 2, 1)
        .unwrap()
        .unwrap();
    assert_eq!(row.episode_id, Some(episode.id));
}

#[test]
fn progress_reports_each_season_and_match_summary() {
    let h = harness(FakeCatalog::standard());
    let folder = h.add("Breaking Bad", false);
    let events = h.run();

    let progress: Vec<(JobStage, String)> = events
        .iter()
        .filter_map(|e| match e {
            ScanEvent::JobProgress { stage, details, .. } => Some((*stage, details.clone())),
            _ => None,
        })
        .collect();
    let downloads: Vec<&str> = progress
        .iter()
        .filter(|(stage, _)| *stage == JobStage::Downloading)
        .map(|(_, d)| d.as_str())
        .collect();
    assert_eq!(downloads, vec!["Season 1", "Season 2"]);
    assert_eq!(
        progress.last().map(|(_, d)| d.as_str()),
        Some("Matched 3/3 videos")
    );
    assert!(events.iter().all(|e| e.folder().is_none_or(|f| *f == folder)));
}

#[test]
fn ambiguous_folder_is_parked() {
    let h = harness(FakeCatalog::standard());
    let folder = h.add("Mirror Black", false);
    let events = h.run();

    let job = h.job(&folder);
    assert_eq!(job.status, JobStatus::Uncertain);
    assert!(job.result.is_none());

    let candidates = events
        .iter()
        .find_map(|e| match e {
            ScanEvent::JobUncertain { candidates, .. } => Some(candidates.clone()),
            _ => None,
        })
        .unwrap();
    assert!(candidates.iter().any(|c| c.external_id == 305 && c.confidence == 50.0));
    assert_eq!(job.candidates, candidates);

    assert_eq!(h.catalog.season_lists(), 0);
    assert_eq!(h.store.counts().unwrap().shows, 0);
}

#[test]
fn silent_job_does_not_surface_ambiguity() {
    let h = harness(FakeCatalog::standard());
    let folder = h.add("Mirror Black", true);
    let events = h.run();

    let job = h.job(&folder);
    assert_eq!(job.status, JobStatus::Complete);
    assert!(job.result.is_none());
    assert_eq!(count_uncertain(&events), 0);
    assert_eq!(h.store.counts().unwrap().shows, 0);
}

#[test]
fn no_candidates_completes_without_result() {
    let h = harness(FakeCatalog::default().with_show(1, "Friends", &[1]));
    let folder = h.add("Breaking Bad", false);
    h.run();

    let job = h.job(&folder);
    assert_eq!(job.status, JobStatus::Complete);
    assert!(job.result.is_none());
}

// ── Skip rules ──────────────────────────────────────────────────────────────

#[test]
fn season_folder_is_skipped_without_search() {
    let h = harness(FakeCatalog::standard());
    let folder = h.add("Season 2", false);
    h.run();

    let job = h.job(&folder);
    assert_eq!(job.status, JobStatus::Complete);
    assert!(job.result.is_none());
    assert_eq!(h.catalog.searches(), 0);
}

#[test]
fn container_folder_is_skipped_without_search() {
    let h = harness(FakeCatalog::standard());
    let folder = h.add("Library", false);
    h.run();

    let job = h.job(&folder);
    assert_eq!(job.status, JobStatus::Complete);
    assert!(job.result.is_none());
    assert_eq!(h.catalog.searches(), 0);
}

#[test]
fn folder_without_videos_is_skipped() {
    let h = harness(FakeCatalog::standard());
    let folder = h.add("Empty Show", false);
    h.run();

    assert_eq!(h.job(&folder).status, JobStatus::Complete);
    assert_eq!(h.catalog.searches(), 0);
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[test]
fn missing_folder_fails_job_and_pipeline_continues() {
    let h = harness(FakeCatalog::standard());
    let missing = h.add("Nope", false);
    let good = h.add("Breaking Bad", false);
    let events = h.run();

    let job = h.job(&missing);
    assert_eq!(job.status, JobStatus::Error);
    assert!(job.error_message.unwrap().contains("not found"));
    assert!(events.iter().any(|e| matches!(e, ScanEvent::JobError { folder, .. } if *folder == missing)));

    assert_eq!(h.job(&good).status, JobStatus::Complete);
    assert_eq!(
        h.pipeline.stats(),
        ScanStats {
            total: 2,
            completed: 2,
            errors: 1
        }
    );
}

#[test]
fn catalog_failure_is_a_job_error() {
    let h = harness(FakeCatalog {
        fail_search: true,
        ..FakeCatalog::standard()
    });
    let folder = h.add("Breaking Bad", false);
    h.run();

    let job = h.job(&folder);
    assert_eq!(job.status, JobStatus::Error);
    assert!(job.error_message.unwrap().contains("503"));
}

// ── Resolution protocol ─────────────────────────────────────────────────────

#[test]
fn resolve_stores_chosen_show_and_links_videos() {
    let h = harness(FakeCatalog::standard());
    let folder = h.add("Mirror Black", false);
    h.run();

    let choice = h.job(&folder).candidates[0].clone();
    let resolved = h
        .pipeline
        .resolve_uncertain(&folder, choice)
        .unwrap()
        .wait()
        .unwrap();
    assert_eq!(resolved.external_id, 305);

    let job = h.job(&folder);
    assert_eq!(job.status, JobStatus::Complete);
    assert_eq!(job.result.map(|s| s.external_id), Some(305));
    assert!(job.candidates.is_empty());

    let counts = h.store.counts().unwrap();
    assert_eq!(counts.shows, 1);
    assert_eq!(counts.episodes, 3);
    assert_eq!(counts.linked_videos, 1);

    let events = h.drain();
    assert!(events.iter().any(|e| matches!(
        e,
        ScanEvent::JobCompleted { show: Some(s), .. } if s.external_id == 305
    )));
    assert!(matches!(events.last(), Some(ScanEvent::ScanStats(_))));
}

#[test]
fn resolution_claims_job_immediately() {
    let h = harness(FakeCatalog::standard());
    let folder = h.add("Mirror Black", false);
    h.run();

    let choice = h.job(&folder).candidates[0].clone();
    let resolution = h.pipeline.resolve_uncertain(&folder, choice.clone()).unwrap();

    assert!(matches!(
        h.pipeline.skip_uncertain(&folder),
        Err(PipelineError::JobNotFound(_))
    ));
    assert!(matches!(
        h.pipeline.resolve_uncertain(&folder, choice),
        Err(PipelineError::JobNotFound(_))
    ));
    resolution.wait().unwrap();
}

#[test]
fn failed_resolution_marks_job_error() {
    let h = harness(FakeCatalog {
        fail_seasons_for: Some(305),
        ..FakeCatalog::standard()
    });
    let folder = h.add("Mirror Black", false);
    h.run();

    let choice = h.job(&folder).candidates[0].clone();
    let err = h
        .pipeline
        .resolve_uncertain(&folder, choice)
        .unwrap()
        .wait()
        .unwrap_err();
    assert!(matches!(err, PipelineError::Resolution(ScanError::Catalog(_))));

    let job = h.job(&folder);
    assert_eq!(job.status, JobStatus::Error);
    assert!(job.error_message.is_some());
    assert_eq!(h.store.counts().unwrap().shows, 0);
}

#[test]
fn skip_completes_without_writing() {
    let h = harness(FakeCatalog::standard());
    let folder = h.add("Mirror Black", false);
    h.run();

    h.pipeline.skip_uncertain(&folder).unwrap();

    let job = h.job(&folder);
    assert_eq!(job.status, JobStatus::Complete);
    assert!(job.result.is_none());
    assert_eq!(h.store.counts().unwrap().shows, 0);
    assert_eq!(h.catalog.season_lists(), 0);

    let events = h.drain();
    assert!(matches!(
        events.as_slice(),
        [ScanEvent::JobCompleted { show: None, .. }, ScanEvent::ScanStats(_)]
    ));
}

#[test]
fn settling_a_job_that_is_not_uncertain_fails() {
    let h = harness(FakeCatalog::standard());
    let done = h.add("Breaking Bad", false);
    h.run();
    let before = h.job(&done);

    let other = MatchedShow {
        external_id: 305,
        name: "Black Mirror".into(),
        kind: None,
        poster_url: None,
        confidence: 100.0,
    };
    assert!(matches!(
        h.pipeline.resolve_uncertain(&done, other),
        Err(PipelineError::JobNotFound(_))
    ));
    assert!(matches!(
        h.pipeline.skip_uncertain(&done),
        Err(PipelineError::JobNotFound(_))
    ));
    assert!(matches!(
        h.pipeline.skip_uncertain(&h.folder("Unknown")),
        Err(PipelineError::JobNotFound(_))
    ));

    let after = h.job(&done);
    assert_eq!(after.status, before.status);
    assert_eq!(after.result, before.result);
    assert_eq!(h.store.counts().unwrap().shows, 1);
}

// ── Scheduling ──────────────────────────────────────────────────────────────

#[test]
fn jobs_start_in_the_order_added() {
    let h = harness(FakeCatalog::standard());
    let order = ["Empty Show", "Mirror Black", "Season 2", "Breaking Bad", "Library"];
    let folders: Vec<PathBuf> = order.iter().map(|name| h.add(name, false)).collect();
    let events = h.run();

    let started: Vec<PathBuf> = events
        .iter()
        .filter_map(|e| match e {
            ScanEvent::JobStarted { folder } => Some(folder.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(started, folders);
    assert!(matches!(
        &events[events.len() - 2..],
        [ScanEvent::AllJobsComplete, ScanEvent::ScanStats(_)]
    ));
}

#[test]
fn stats_never_break_invariant() {
    let h = harness(FakeCatalog::standard());
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = seen.clone();
    let pipeline = &h.pipeline;
    pipeline.subscribe(move |event| {
        if let ScanEvent::ScanStats(stats) = event {
            sink.lock().unwrap().push(*stats);
        }
    });

    for name in ["Nope", "Breaking Bad", "Mirror Black", "Season 2"] {
        h.add(name, false);
        let stats = pipeline.stats();
        assert!(stats.errors <= stats.completed && stats.completed <= stats.total);
    }
    h.run();
    let folder = h.folder("Mirror Black");
    pipeline.skip_uncertain(&folder).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    for stats in seen.iter() {
        assert!(stats.errors <= stats.completed && stats.completed <= stats.total);
    }
    assert_eq!(
        *seen.last().unwrap(),
        ScanStats {
            total: 4,
            completed: 4,
            errors: 1
        }
    );
    assert_eq!(pipeline.stats(), *seen.last().unwrap());
}

#[test]
fn rescanning_does_not_change_row_counts() {
    let h = harness(FakeCatalog::standard());
    h.add("Breaking Bad", false);
    h.run();
    let first = h.store.counts().unwrap();

    h.pipeline.reset();
    h.add("Breaking Bad", false);
    h.run();
    assert_eq!(h.store.counts().unwrap(), first);
}

#[test]
fn start_requires_jobs_and_a_stopped_worker() {
    let h = harness(FakeCatalog {
        search_delay: Some(Duration::from_millis(300)),
        ..FakeCatalog::standard()
    });
    assert!(matches!(h.pipeline.start(), Err(PipelineError::NoJobs)));

    h.add("Breaking Bad", false);
    h.pipeline.start().unwrap();
    assert!(h.pipeline.is_running());
    assert!(matches!(h.pipeline.start(), Err(PipelineError::AlreadyRunning)));

    h.pipeline.wait();
    assert!(!h.pipeline.is_running());
}

#[test]
fn duplicate_active_job_is_rejected() {
    let h = harness(FakeCatalog::standard());
    h.add("Breaking Bad", false);
    assert!(matches!(
        h.pipeline.add_job(h.folder("Breaking Bad"), true),
        Err(PipelineError::DuplicateJob(_))
    ));
    h.run();

    // Finished jobs do not block a re-scan.
    let id = h.pipeline.add_job(h.folder("Breaking Bad"), false).unwrap();
    let job = h.job(&h.folder("Breaking Bad"));
    assert_eq!(job.id, id);
    assert_eq!(job.status, JobStatus::Pending);
}

#[test]
fn stop_lets_current_job_finish() {
    let h = harness(FakeCatalog {
        search_delay: Some(Duration::from_millis(300)),
        ..FakeCatalog::standard()
    });
    let first = h.add("Breaking Bad", false);
    let second = h.add("Mirror Black", true);

    h.pipeline.start().unwrap();
    let started = h.events.recv_timeout(Duration::from_secs(5)).unwrap();
    assert!(matches!(started, ScanEvent::JobStarted { .. }));
    h.pipeline.stop();
    h.pipeline.wait();

    assert_eq!(h.job(&first).status, JobStatus::Complete);
    assert_eq!(h.job(&second).status, JobStatus::Pending);
    let events = h.drain();
    assert!(!events.iter().any(|e| matches!(e, ScanEvent::AllJobsComplete)));
    assert!(matches!(events.last(), Some(ScanEvent::ScanStats(_))));

    // Starting again resumes at the next job.
    let events = h.run();
    assert_eq!(h.job(&second).status, JobStatus::Complete);
    assert!(events.iter().any(|e| matches!(e, ScanEvent::AllJobsComplete)));
    assert_eq!(h.catalog.searches(), 2);
}

#[test]
fn reset_clears_jobs() {
    let h = harness(FakeCatalog {
        search_delay: Some(Duration::from_millis(200)),
        ..FakeCatalog::standard()
    });
    h.add("Breaking Bad", false);
    h.add("Mirror Black", false);
    h.pipeline.start().unwrap();
    wait_for_search(&h);

    h.pipeline.reset();

    assert!(h.pipeline.jobs().is_empty());
    assert!(!h.pipeline.is_running());
    assert_eq!(h.pipeline.stats(), ScanStats::default());
    // Only the in-flight job ran, and its results were dropped.
    assert_eq!(h.catalog.searches(), 1);
    assert_eq!(h.store.counts().unwrap().shows, 0);
    assert!(!h
        .drain()
        .iter()
        .any(|e| matches!(e, ScanEvent::JobCompleted { .. } | ScanEvent::JobError { .. })));
}

#[test]
fn detached_worker_writes_nothing_after_reset() {
    let h = harness(FakeCatalog {
        search_delay: Some(Duration::from_millis(5500)),
        ..FakeCatalog::standard()
    });
    h.add("Breaking Bad", false);
    h.pipeline.start().unwrap();
    wait_for_search(&h);

    h.pipeline.reset();
    assert!(!h.pipeline.is_running());

    // Let the detached worker come back from its search.
    std::thread::sleep(Duration::from_millis(1500));
    assert_eq!(h.catalog.season_lists(), 1);
    assert_eq!(h.store.counts().unwrap().shows, 0);
    assert!(h.pipeline.jobs().is_empty());
}

/// Block until the worker has announced its catalog search.
fn wait_for_search(h: &Harness) {
    loop {
        let event = h.events.recv_timeout(Duration::from_secs(5)).unwrap();
        if let ScanEvent::JobProgress {
            stage: JobStage::Searching,
            ..
        } = event
        {
            return;
        }
    }
}

// ── Panics ──────────────────────────────────────────────────────────────────

#[test]
fn panicking_job_is_an_error_and_worker_continues() {
    let h = harness(FakeCatalog {
        panic_search_for: Some("Breaking Bad"),
        ..FakeCatalog::standard()
    });
    let bad = h.add("Breaking Bad", false);
    let next = h.add("Mirror Black", true);

    let events = h.run();

    let job = h.job(&bad);
    assert_eq!(job.status, JobStatus::Error);
    assert!(job.error_message.unwrap().contains("search blew up"));
    assert!(job.ended_at.is_some());
    assert_eq!(h.job(&next).status, JobStatus::Complete);
    assert!(events.iter().any(|e| matches!(e, ScanEvent::JobError { folder, .. } if *folder == bad)));
    assert!(events.iter().any(|e| matches!(e, ScanEvent::AllJobsComplete)));

    assert!(!h.pipeline.is_running());
    assert_eq!(
        h.pipeline.stats(),
        ScanStats {
            total: 2,
            completed: 2,
            errors: 1
        }
    );
    // The pipeline can be started again.
    h.pipeline.start().unwrap();
    h.pipeline.wait();
    assert!(!h.pipeline.is_running());
}

#[test]
fn panicking_listener_does_not_stall_the_scan() {
    let h = harness(FakeCatalog::standard());
    h.pipeline.subscribe(|event| {
        if let ScanEvent::JobProgress {
            stage: JobStage::Searching,
            ..
        } = event
        {
            panic!("listener failed");
        }
    });
    let first = h.add("Breaking Bad", false);
    let second = h.add("Mirror Black", true);

    let events = h.run();

    assert_eq!(h.job(&first).status, JobStatus::Complete);
    assert_eq!(h.job(&first).result.unwrap().external_id, 169);
    assert_eq!(h.job(&second).status, JobStatus::Complete);
    assert!(events.iter().any(|e| matches!(e, ScanEvent::AllJobsComplete)));
    assert!(!h.pipeline.is_running());
}

// ── Posters ─────────────────────────────────────────────────────────────────

#[test]
fn posters_are_cached_and_recorded() {
    let posters = tempfile::tempdir().unwrap();
    let h = harness_with(
        FakeCatalog::standard(),
        PipelineOptions {
            poster_cache_dir: Some(posters.path().to_path_buf()),
            ..fast_options()
        },
    );
    h.add("Breaking Bad", false);
    h.run();

    let show = h.store.get_show_by_external_id(169).unwrap().unwrap();
    let cached = show.cached_poster_path.unwrap();
    assert!(Path::new(&cached).exists());

    let seasons = h.store.get_seasons_for_show(show.id).unwrap();
    assert!(seasons.iter().all(|s| s.cached_poster_path.is_some()));
    assert!(posters.path().join("season_169_2.jpg").exists());
    assert_eq!(h.catalog.downloads.load(Ordering::SeqCst), 3);
}
