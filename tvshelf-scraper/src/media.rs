//! On-disk poster cache.
//!
//! Posters are stored flat in one directory:
//! ```text
//! show_169.jpg
//! season_169_1.jpg
//! ```

use std::path::{Path, PathBuf};

use tvshelf_catalog::types::ShowHierarchy;

use crate::catalog::CatalogService;
use crate::error::CatalogError;

/// How many seasons get their poster cached per show.
pub const SEASON_POSTER_LIMIT: usize = 3;

#[derive(Debug, Clone)]
pub struct PosterCache {
    dir: PathBuf,
}

/// Posters that are present in the cache after a download pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct CachedPosters {
    pub show: Option<PathBuf>,
    /// `(season_number, path)` pairs.
    pub seasons: Vec<(u32, PathBuf)>,
}

impl PosterCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn show_poster_path(&self, external_id: i64) -> PathBuf {
        self.dir.join(format!("show_{external_id}.jpg"))
    }

    pub fn season_poster_path(&self, external_id: i64, season_number: u32) -> PathBuf {
        self.dir
            .join(format!("season_{external_id}_{season_number}.jpg"))
    }

    /// Download `url` to `dest` unless the file is already there.
    pub fn fetch(
        &self,
        catalog: &dyn CatalogService,
        url: &str,
        dest: &Path,
    ) -> Result<PathBuf, CatalogError> {
        if dest.exists() {
            return Ok(dest.to_path_buf());
        }
        std::fs::create_dir_all(&self.dir)?;
        let bytes = catalog.download_image(url)?;
        std::fs::write(dest, &bytes)?;
        log::debug!("Cached poster {}", dest.display());
        Ok(dest.to_path_buf())
    }

    /// Cache the show poster and the first few season posters.
    ///
    /// Failures are logged and skipped; a missing poster never fails a scan.
    pub fn cache_hierarchy(
        &self,
        catalog: &dyn CatalogService,
        hierarchy: &ShowHierarchy,
    ) -> CachedPosters {
        let show = &hierarchy.show;
        let mut cached = CachedPosters::default();

        if let Some(url) = &show.poster_url {
            let dest = self.show_poster_path(show.external_id);
            match self.fetch(catalog, url, &dest) {
                Ok(path) => cached.show = Some(path),
                Err(e) => log::warn!("Failed to cache poster for '{}': {}", show.name, e),
            }
        }

        for entry in hierarchy.seasons.iter().take(SEASON_POSTER_LIMIT) {
            let Some(url) = &entry.season.poster_url else {
                continue;
            };
            let number = entry.season.number;
            let dest = self.season_poster_path(show.external_id, number);
            match self.fetch(catalog, url, &dest) {
                Ok(path) => cached.seasons.push((number, path)),
                Err(e) => log::warn!(
                    "Failed to cache season {} poster for '{}': {}",
                    number,
                    show.name,
                    e
                ),
            }
        }

        cached
    }
}
