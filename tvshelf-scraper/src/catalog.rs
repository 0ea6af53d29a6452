//! The catalog operations the scanner consumes.

use std::sync::Arc;

use tvshelf_catalog::types::{CatalogEpisode, CatalogSeason, ShowCandidate};

use crate::error::CatalogError;

/// A remote show catalog: search by name, list seasons, list episodes, and
/// fetch poster images.
///
/// Implementations must be shareable across threads; the scan worker and
/// resolution threads call into the same instance.
pub trait CatalogService: Send + Sync {
    /// Search shows by name, best hits first.
    fn search_shows(&self, name: &str) -> Result<Vec<ShowCandidate>, CatalogError>;

    /// List the seasons of a show by its external id.
    fn list_seasons(&self, external_id: i64) -> Result<Vec<CatalogSeason>, CatalogError>;

    /// List the episodes of a season by the catalog's season id.
    fn list_episodes(&self, season_id: i64) -> Result<Vec<CatalogEpisode>, CatalogError>;

    /// Download an image and return its bytes.
    fn download_image(&self, url: &str) -> Result<Vec<u8>, CatalogError>;
}

impl<C: CatalogService + ?Sized> CatalogService for Arc<C> {
    fn search_shows(&self, name: &str) -> Result<Vec<ShowCandidate>, CatalogError> {
        (**self).search_shows(name)
    }

    fn list_seasons(&self, external_id: i64) -> Result<Vec<CatalogSeason>, CatalogError> {
        (**self).list_seasons(external_id)
    }

    fn list_episodes(&self, season_id: i64) -> Result<Vec<CatalogEpisode>, CatalogError> {
        (**self).list_episodes(season_id)
    }

    fn download_image(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        (**self).download_image(url)
    }
}
