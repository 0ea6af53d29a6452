//! Thread-safe handle over the metadata database.
//!
//! The scan worker and resolution calls arriving from other threads share one
//! [`MetadataStore`]. Each method locks the connection for exactly one unit of
//! work, so writes (and reads) are serialized.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::Connection;
use tvshelf_catalog::types::*;

use crate::operations::{self, OperationError};
use crate::queries::{self, EpisodeLocation, StoreCounts};
use crate::schema::{self, SchemaError};

pub struct MetadataStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for MetadataStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataStore").finish_non_exhaustive()
    }
}

impl MetadataStore {
    /// Open or create the database at `path`.
    pub fn open(path: &Path) -> Result<Self, SchemaError> {
        Ok(Self::from_connection(schema::open_database(path)?))
    }

    /// In-memory store with the full schema.
    pub fn open_memory() -> Result<Self, SchemaError> {
        Ok(Self::from_connection(schema::open_memory()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // A panic while holding the lock cannot leave SQLite half-written:
        // every multi-statement unit runs in a transaction.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ── Writes ──────────────────────────────────────────────────────────────

    pub fn upsert_show(&self, show: &MatchedShow) -> Result<i64, OperationError> {
        operations::upsert_show(&self.lock(), show)
    }

    pub fn upsert_season(&self, show_id: i64, season: &CatalogSeason) -> Result<i64, OperationError> {
        operations::upsert_season(&self.lock(), show_id, season)
    }

    pub fn upsert_episode(
        &self,
        season_id: i64,
        episode: &CatalogEpisode,
    ) -> Result<i64, OperationError> {
        operations::upsert_episode(&self.lock(), season_id, episode)
    }

    pub fn upsert_video(&self, path: &str, episode_id: Option<i64>) -> Result<i64, OperationError> {
        operations::upsert_video(&self.lock(), path, episode_id)
    }

    /// Persist a whole show hierarchy atomically. Returns the show row id.
    pub fn store_hierarchy(&self, hierarchy: &ShowHierarchy) -> Result<i64, OperationError> {
        operations::store_hierarchy(&mut self.lock(), hierarchy)
    }

    pub fn set_show_cached_poster(&self, external_id: i64, path: &str) -> Result<(), OperationError> {
        operations::set_show_cached_poster(&self.lock(), external_id, path)
    }

    pub fn set_season_cached_poster(
        &self,
        show_id: i64,
        season_number: u32,
        path: &str,
    ) -> Result<(), OperationError> {
        operations::set_season_cached_poster(&self.lock(), show_id, season_number, path)
    }

    /// Wipe the show hierarchy, keeping video rows with their links cleared.
    pub fn clear_show_metadata(&self) -> Result<(), OperationError> {
        operations::clear_show_metadata(&mut self.lock())
    }

    /// Wipe every table.
    pub fn reset_all(&self) -> Result<(), OperationError> {
        operations::reset_all(&mut self.lock())
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    pub fn get_show_by_external_id(&self, external_id: i64) -> Result<Option<Show>, OperationError> {
        queries::get_show_by_external_id(&self.lock(), external_id)
    }

    pub fn get_all_shows(&self) -> Result<Vec<Show>, OperationError> {
        queries::get_all_shows(&self.lock())
    }

    pub fn get_season(&self, show_id: i64, season_number: u32) -> Result<Option<Season>, OperationError> {
        queries::get_season(&self.lock(), show_id, season_number)
    }

    pub fn get_seasons_for_show(&self, show_id: i64) -> Result<Vec<Season>, OperationError> {
        queries::get_seasons_for_show(&self.lock(), show_id)
    }

    pub fn get_episode_by_season_and_number(
        &self,
        show_id: i64,
        season_number: u32,
        episode_number: u32,
    ) -> Result<Option<Episode>, OperationError> {
        queries::get_episode_by_season_and_number(&self.lock(), show_id, season_number, episode_number)
    }

    pub fn get_episodes_for_season(&self, season_id: i64) -> Result<Vec<Episode>, OperationError> {
        queries::get_episodes_for_season(&self.lock(), season_id)
    }

    pub fn get_episode_location(&self, episode_id: i64) -> Result<Option<EpisodeLocation>, OperationError> {
        queries::get_episode_location(&self.lock(), episode_id)
    }

    pub fn get_video_by_path(&self, path: &str) -> Result<Option<Video>, OperationError> {
        queries::get_video_by_path(&self.lock(), path)
    }

    pub fn get_video_for_episode(&self, episode_id: i64) -> Result<Option<Video>, OperationError> {
        queries::get_video_for_episode(&self.lock(), episode_id)
    }

    pub fn counts(&self) -> Result<StoreCounts, OperationError> {
        queries::store_counts(&self.lock())
    }
}
