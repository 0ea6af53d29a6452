//! Write operations for the show hierarchy and video links.
//!
//! Every upsert is keyed by the row's natural identity, so replaying the same
//! catalog data never creates duplicate rows.

use rusqlite::{params, Connection};
use thiserror::Error;
use tvshelf_catalog::types::*;

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity_type} with id '{id}'")]
    NotFound { entity_type: String, id: String },
}

// ── Show Operations ─────────────────────────────────────────────────────────

/// Insert or update a show by its external id. Returns the row id.
///
/// The cached poster path is left untouched so a re-scan does not forget a
/// poster that was already downloaded.
pub fn upsert_show(conn: &Connection, show: &MatchedShow) -> Result<i64, OperationError> {
    let id = conn.query_row(
        "INSERT INTO shows (external_id, name, poster_url)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(external_id) DO UPDATE SET
             name = excluded.name,
             poster_url = excluded.poster_url
         RETURNING id",
        params![show.external_id, show.name, show.poster_url],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Record where a show's poster was cached on disk.
pub fn set_show_cached_poster(
    conn: &Connection,
    external_id: i64,
    path: &str,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE shows SET cached_poster_path = ?2 WHERE external_id = ?1",
        params![external_id, path],
    )?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "show".to_string(),
            id: external_id.to_string(),
        });
    }
    Ok(())
}

// ── Season Operations ───────────────────────────────────────────────────────

/// Insert or update a season keyed by `(show_id, number)`. Returns the row id.
pub fn upsert_season(
    conn: &Connection,
    show_id: i64,
    season: &CatalogSeason,
) -> Result<i64, OperationError> {
    let id = conn.query_row(
        "INSERT INTO seasons (show_id, season_number, poster_url)
         VALUES (?1, ?2, ?3)
         ON CONFLICT(show_id, season_number) DO UPDATE SET
             poster_url = excluded.poster_url
         RETURNING id",
        params![show_id, season.number, season.poster_url],
        |row| row.get(0),
    )?;
    Ok(id)
}

/// Record where a season's poster was cached on disk.
pub fn set_season_cached_poster(
    conn: &Connection,
    show_id: i64,
    season_number: u32,
    path: &str,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE seasons SET cached_poster_path = ?3 WHERE show_id = ?1 AND season_number = ?2",
        params![show_id, season_number, path],
    )?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity_type: "season".to_string(),
            id: format!("{show_id}/{season_number}"),
        });
    }
    Ok(())
}

// ── Episode Operations ──────────────────────────────────────────────────────

/// Insert or update an episode keyed by `(season_id, number)`. Returns the row id.
pub fn upsert_episode(
    conn: &Connection,
    season_id: i64,
    episode: &CatalogEpisode,
) -> Result<i64, OperationError> {
    let id = conn.query_row(
        "INSERT INTO episodes (season_id, episode_number, name, airdate, summary, poster_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(season_id, episode_number) DO UPDATE SET
             name = excluded.name,
             airdate = excluded.airdate,
             summary = excluded.summary,
             poster_url = excluded.poster_url
         RETURNING id",
        params![
            season_id,
            episode.number,
            episode.name,
            episode.airdate,
            episode.summary,
            episode.poster_url,
        ],
        |row| row.get(0),
    )?;
    Ok(id)
}

// ── Video Operations ────────────────────────────────────────────────────────

/// Insert or update a video keyed by path. The episode link is overwritten.
pub fn upsert_video(
    conn: &Connection,
    path: &str,
    episode_id: Option<i64>,
) -> Result<i64, OperationError> {
    let id = conn.query_row(
        "INSERT INTO videos (path, episode_id)
         VALUES (?1, ?2)
         ON CONFLICT(path) DO UPDATE SET
             episode_id = excluded.episode_id
         RETURNING id",
        params![path, episode_id],
        |row| row.get(0),
    )?;
    Ok(id)
}

// ── Hierarchy ───────────────────────────────────────────────────────────────

/// Persist a show with all its seasons and episodes in one transaction.
///
/// Either the whole hierarchy lands or nothing does. Returns the show row id.
pub fn store_hierarchy(
    conn: &mut Connection,
    hierarchy: &ShowHierarchy,
) -> Result<i64, OperationError> {
    let tx = conn.transaction()?;
    let show_id = upsert_show(&tx, &hierarchy.show)?;

    for entry in &hierarchy.seasons {
        let season_id = upsert_season(&tx, show_id, &entry.season)?;
        for episode in &entry.episodes {
            upsert_episode(&tx, season_id, episode)?;
        }
    }

    tx.commit()?;
    Ok(show_id)
}

// ── Maintenance ─────────────────────────────────────────────────────────────

/// Wipe shows, seasons, and episodes. Video rows survive with their episode
/// links cleared.
pub fn clear_show_metadata(conn: &mut Connection) -> Result<(), OperationError> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        "UPDATE videos SET episode_id = NULL;
         DELETE FROM episodes;
         DELETE FROM seasons;
         DELETE FROM shows;",
    )?;
    tx.commit()?;
    Ok(())
}

/// Wipe every table.
pub fn reset_all(conn: &mut Connection) -> Result<(), OperationError> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        "DELETE FROM videos;
         DELETE FROM episodes;
         DELETE FROM seasons;
         DELETE FROM shows;",
    )?;
    tx.commit()?;
    Ok(())
}
