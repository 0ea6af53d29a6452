//! SQLite persistence layer for the show/season/episode hierarchy.
//!
//! Provides schema creation, idempotent upserts keyed by natural identity,
//! lookup queries, and the thread-safe [`MetadataStore`] handle used by the
//! scan pipeline. Backed by SQLite (via rusqlite with bundled feature).

pub mod operations;
pub mod queries;
pub mod schema;
pub mod store;

pub use operations::{
    clear_show_metadata, reset_all, set_season_cached_poster, set_show_cached_poster,
    store_hierarchy, upsert_episode, upsert_season, upsert_show, upsert_video, OperationError,
};
pub use queries::{
    get_all_shows, get_episode_by_season_and_number, get_episode_location, get_episodes_for_season,
    get_season, get_seasons_for_show, get_show_by_external_id, get_video_by_path, get_video_for_episode,
    store_counts, EpisodeLocation, StoreCounts,
};
pub use schema::{open_database, open_memory, SchemaError};
pub use store::MetadataStore;
