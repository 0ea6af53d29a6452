//! Per-job work: classify, search, store, and link videos.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tvshelf_catalog::types::MatchedShow;
use tvshelf_catalog::{parse_filename, ParsedFilename};
use tvshelf_db::MetadataStore;
use tvshelf_scraper::{fetch_hierarchy, CatalogService, MatchOutcome, PosterCache, ShowMatcher};

use crate::classifier::{classify_folder, FolderKind};
use crate::error::ScanError;
use crate::events::{EventBus, JobStage, ScanEvent};
use crate::scanner::find_video_files;

/// How a job ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum JobOutcome {
    /// Done; `None` when the folder was skipped or nothing matched.
    Complete(Option<MatchedShow>),
    /// Needs a decision between these candidates.
    Uncertain(Vec<MatchedShow>),
}

pub(crate) struct JobProcessor {
    pub catalog: Arc<dyn CatalogService>,
    pub store: Arc<MetadataStore>,
    pub matcher: ShowMatcher,
    pub extensions: HashSet<String>,
    pub posters: Option<PosterCache>,
    pub events: Arc<EventBus>,
}

impl JobProcessor {
    fn progress(&self, folder: &Path, stage: JobStage, details: impl Into<String>) {
        self.events.emit(ScanEvent::JobProgress {
            folder: folder.to_path_buf(),
            stage,
            details: details.into(),
        });
    }

    /// Run one job. `abandoned` is raised when the pipeline is reset; the job
    /// then stops before its next catalog search or store write.
    pub fn process_job(
        &self,
        folder: &Path,
        silent: bool,
        abandoned: &AtomicBool,
    ) -> Result<JobOutcome, ScanError> {
        let name = folder_name(folder);
        self.progress(folder, JobStage::Initializing, format!("Checking {name}"));

        if !folder.is_dir() {
            return Err(ScanError::FolderNotFound(folder.to_path_buf()));
        }

        match classify_folder(folder, &self.extensions)? {
            FolderKind::Season => {
                log::info!("[SKIP] {}: season folder", name);
                return Ok(JobOutcome::Complete(None));
            }
            FolderKind::Container => {
                log::info!("[SKIP] {}: container folder", name);
                return Ok(JobOutcome::Complete(None));
            }
            FolderKind::Show => {}
        }

        self.progress(folder, JobStage::Scanning, "Looking for video files");
        let videos = find_video_files(folder, &self.extensions);
        if videos.is_empty() {
            log::info!("[SKIP] {}: no video files", name);
            return Ok(JobOutcome::Complete(None));
        }

        check_abandoned(abandoned)?;
        self.progress(folder, JobStage::Searching, format!("Searching catalog for '{name}'"));
        match self.matcher.identify(self.catalog.as_ref(), &name)? {
            MatchOutcome::Accepted(show) => {
                log::info!(
                    "[MATCH] {} -> {} ({:.0}%)",
                    name,
                    show.name,
                    show.confidence
                );
                self.store_show(folder, &show, &videos, abandoned)?;
                Ok(JobOutcome::Complete(Some(show)))
            }
            MatchOutcome::Uncertain(candidates) if !silent => {
                log::info!("[UNCERTAIN] {}: {} candidate(s)", name, candidates.len());
                Ok(JobOutcome::Uncertain(candidates))
            }
            MatchOutcome::Uncertain(_) | MatchOutcome::NotFound => {
                log::info!("[NO MATCH] {}", name);
                Ok(JobOutcome::Complete(None))
            }
        }
    }

    /// Video files of a folder that is being resolved.
    pub fn videos_in(&self, folder: &Path) -> Result<Vec<PathBuf>, ScanError> {
        if !folder.is_dir() {
            return Err(ScanError::FolderNotFound(folder.to_path_buf()));
        }
        Ok(find_video_files(folder, &self.extensions))
    }

    /// Fetch and persist the show hierarchy, cache posters, then link videos.
    pub fn store_show(
        &self,
        folder: &Path,
        show: &MatchedShow,
        videos: &[PathBuf],
        abandoned: &AtomicBool,
    ) -> Result<(), ScanError> {
        let hierarchy = fetch_hierarchy(self.catalog.as_ref(), show, |number| {
            self.progress(folder, JobStage::Downloading, format!("Season {number}"));
        })?;
        check_abandoned(abandoned)?;

        self.progress(
            folder,
            JobStage::Storing,
            format!(
                "{} season(s), {} episode(s)",
                hierarchy.seasons.len(),
                hierarchy.episode_count()
            ),
        );
        let show_id = self.store.store_hierarchy(&hierarchy)?;

        if let Some(cache) = &self.posters {
            self.progress(folder, JobStage::CachingPosters, show.name.clone());
            let cached = cache.cache_hierarchy(self.catalog.as_ref(), &hierarchy);
            if let Some(path) = cached.show {
                if let Err(e) = self
                    .store
                    .set_show_cached_poster(show.external_id, &path.to_string_lossy())
                {
                    log::warn!("Failed to record poster for '{}': {}", show.name, e);
                }
            }
            for (number, path) in cached.seasons {
                if let Err(e) =
                    self.store
                        .set_season_cached_poster(show_id, number, &path.to_string_lossy())
                {
                    log::warn!("Failed to record season {} poster: {}", number, e);
                }
            }
        }

        check_abandoned(abandoned)?;
        self.progress(folder, JobStage::Matching, "Linking video files to episodes");
        let linked = self.associate_videos(show_id, videos)?;
        self.progress(
            folder,
            JobStage::Matching,
            format!("Matched {}/{} videos", linked, videos.len()),
        );
        Ok(())
    }

    /// Link each video whose filename parses to an episode of `show_id`.
    /// Returns how many were linked.
    fn associate_videos(&self, show_id: i64, videos: &[PathBuf]) -> Result<usize, ScanError> {
        let mut linked = 0;
        for video in videos {
            let stem = video.file_stem().and_then(|s| s.to_str()).unwrap_or("");
            let ParsedFilename::Episode {
                season, episode, ..
            } = parse_filename(stem, video)
            else {
                continue;
            };

            match self
                .store
                .get_episode_by_season_and_number(show_id, season, episode)?
            {
                Some(ep) => {
                    self.store
                        .upsert_video(&video.to_string_lossy(), Some(ep.id))?;
                    linked += 1;
                }
                None => log::debug!(
                    "No episode S{:02}E{:02} for {}",
                    season,
                    episode,
                    video.display()
                ),
            }
        }
        Ok(linked)
    }
}

fn check_abandoned(abandoned: &AtomicBool) -> Result<(), ScanError> {
    if abandoned.load(Ordering::SeqCst) {
        Err(ScanError::Abandoned)
    } else {
        Ok(())
    }
}

pub(crate) fn folder_name(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.display().to_string())
}
