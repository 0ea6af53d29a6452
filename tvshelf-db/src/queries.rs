//! Read queries for the metadata database.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tvshelf_catalog::types::*;

use crate::operations::OperationError;

// ── Show Lookups ────────────────────────────────────────────────────────────

/// Find a show by its catalog identifier.
pub fn get_show_by_external_id(
    conn: &Connection,
    external_id: i64,
) -> Result<Option<Show>, OperationError> {
    conn.query_row(
        "SELECT id, external_id, name, poster_url, cached_poster_path
         FROM shows WHERE external_id = ?1",
        params![external_id],
        row_to_show,
    )
    .optional()
    .map_err(Into::into)
}

/// List every show, ordered by name.
pub fn get_all_shows(conn: &Connection) -> Result<Vec<Show>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, external_id, name, poster_url, cached_poster_path
         FROM shows ORDER BY name COLLATE NOCASE, id",
    )?;
    let rows = stmt.query_map([], row_to_show)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Season Lookups ──────────────────────────────────────────────────────────

/// Find one season of a show.
pub fn get_season(
    conn: &Connection,
    show_id: i64,
    season_number: u32,
) -> Result<Option<Season>, OperationError> {
    conn.query_row(
        "SELECT id, show_id, season_number, poster_url, cached_poster_path
         FROM seasons WHERE show_id = ?1 AND season_number = ?2",
        params![show_id, season_number],
        row_to_season,
    )
    .optional()
    .map_err(Into::into)
}

/// List the seasons of a show in season order.
pub fn get_seasons_for_show(conn: &Connection, show_id: i64) -> Result<Vec<Season>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, show_id, season_number, poster_url, cached_poster_path
         FROM seasons WHERE show_id = ?1 ORDER BY season_number",
    )?;
    let rows = stmt.query_map(params![show_id], row_to_season)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Episode Lookups ─────────────────────────────────────────────────────────

/// Find an episode of a show by season and episode number.
pub fn get_episode_by_season_and_number(
    conn: &Connection,
    show_id: i64,
    season_number: u32,
    episode_number: u32,
) -> Result<Option<Episode>, OperationError> {
    conn.query_row(
        "SELECT e.id, e.season_id, e.episode_number, e.name, e.airdate, e.summary,
                e.poster_url, e.cached_poster_path
         FROM episodes e
         JOIN seasons s ON s.id = e.season_id
         WHERE s.show_id = ?1 AND s.season_number = ?2 AND e.episode_number = ?3",
        params![show_id, season_number, episode_number],
        row_to_episode,
    )
    .optional()
    .map_err(Into::into)
}

/// List the episodes of a season in episode order.
pub fn get_episodes_for_season(
    conn: &Connection,
    season_id: i64,
) -> Result<Vec<Episode>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, season_id, episode_number, name, airdate, summary,
                poster_url, cached_poster_path
         FROM episodes WHERE season_id = ?1 ORDER BY episode_number",
    )?;
    let rows = stmt.query_map(params![season_id], row_to_episode)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Where an episode sits in the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeLocation {
    pub show: Show,
    pub season_number: u32,
    pub episode: Episode,
}

/// Resolve an episode id to its show and season.
pub fn get_episode_location(
    conn: &Connection,
    episode_id: i64,
) -> Result<Option<EpisodeLocation>, OperationError> {
    conn.query_row(
        "SELECT sh.id, sh.external_id, sh.name, sh.poster_url, sh.cached_poster_path,
                s.season_number,
                e.id, e.season_id, e.episode_number, e.name, e.airdate, e.summary,
                e.poster_url, e.cached_poster_path
         FROM episodes e
         JOIN seasons s ON s.id = e.season_id
         JOIN shows sh ON sh.id = s.show_id
         WHERE e.id = ?1",
        params![episode_id],
        |row| {
            Ok(EpisodeLocation {
                show: row_to_show(row)?,
                season_number: row.get(5)?,
                episode: Episode {
                    id: row.get(6)?,
                    season_id: row.get(7)?,
                    episode_number: row.get(8)?,
                    name: row.get(9)?,
                    airdate: row.get(10)?,
                    summary: row.get(11)?,
                    poster_url: row.get(12)?,
                    cached_poster_path: row.get(13)?,
                },
            })
        },
    )
    .optional()
    .map_err(Into::into)
}

// ── Video Lookups ───────────────────────────────────────────────────────────

/// Find a video by its path.
pub fn get_video_by_path(conn: &Connection, path: &str) -> Result<Option<Video>, OperationError> {
    conn.query_row(
        "SELECT id, path, episode_id FROM videos WHERE path = ?1",
        params![path],
        row_to_video,
    )
    .optional()
    .map_err(Into::into)
}

/// Find the video linked to an episode, if any. When several files point at
/// the same episode the first one stored wins.
pub fn get_video_for_episode(
    conn: &Connection,
    episode_id: i64,
) -> Result<Option<Video>, OperationError> {
    conn.query_row(
        "SELECT id, path, episode_id FROM videos WHERE episode_id = ?1 ORDER BY id LIMIT 1",
        params![episode_id],
        row_to_video,
    )
    .optional()
    .map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Row counts for every table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounts {
    pub shows: i64,
    pub seasons: i64,
    pub episodes: i64,
    pub videos: i64,
    /// Videos with an episode link.
    pub linked_videos: i64,
}

/// Get row counts for every table.
pub fn store_counts(conn: &Connection) -> Result<StoreCounts, OperationError> {
    let count = |sql: &str| -> Result<i64, rusqlite::Error> { conn.query_row(sql, [], |row| row.get(0)) };

    Ok(StoreCounts {
        shows: count("SELECT COUNT(*) FROM shows")?,
        seasons: count("SELECT COUNT(*) FROM seasons")?,
        episodes: count("SELECT COUNT(*) FROM episodes")?,
        videos: count("SELECT COUNT(*) FROM videos")?,
        linked_videos: count("SELECT COUNT(*) FROM videos WHERE episode_id IS NOT NULL")?,
    })
}

// ── Row Mapping ─────────────────────────────────────────────────────────────

fn row_to_show(row: &Row) -> rusqlite::Result<Show> {
    Ok(Show {
        id: row.get(0)?,
        external_id: row.get(1)?,
        name: row.get(2)?,
        poster_url: row.get(3)?,
        cached_poster_path: row.get(4)?,
    })
}

fn row_to_season(row: &Row) -> rusqlite::Result<Season> {
    Ok(Season {
        id: row.get(0)?,
        show_id: row.get(1)?,
        season_number: row.get(2)?,
        poster_url: row.get(3)?,
        cached_poster_path: row.get(4)?,
    })
}

fn row_to_episode(row: &Row) -> rusqlite::Result<Episode> {
    Ok(Episode {
        id: row.get(0)?,
        season_id: row.get(1)?,
        episode_number: row.get(2)?,
        name: row.get(3)?,
        airdate: row.get(4)?,
        summary: row.get(5)?,
        poster_url: row.get(6)?,
        cached_poster_path: row.get(7)?,
    })
}

fn row_to_video(row: &Row) -> rusqlite::Result<Video> {
    Ok(Video {
        id: row.get(0)?,
        path: row.get(1)?,
        episode_id: row.get(2)?,
    })
}
