//! Data model types for the TV catalog.
//!
//! Two families live here: what the external catalog returns (candidates,
//! seasons, episodes) and what the local store persists (shows, seasons,
//! episodes, videos).

use serde::{Deserialize, Serialize};

// ── Catalog results ─────────────────────────────────────────────────────────

/// A show returned by a catalog name search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowCandidate {
    /// Identifier assigned by the catalog service.
    pub external_id: i64,
    pub name: String,
    /// Content type as reported by the catalog (e.g., "Scripted", "Animation").
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

/// One season of a show as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSeason {
    /// Catalog identifier of the season, used to list its episodes.
    pub season_id: i64,
    pub number: u32,
    #[serde(default)]
    pub poster_url: Option<String>,
}

/// One episode of a season as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEpisode {
    pub number: u32,
    pub name: String,
    #[serde(default)]
    pub airdate: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
}

/// A show chosen for a folder, either by the matcher or by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedShow {
    pub external_id: i64,
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub poster_url: Option<String>,
    /// Match confidence on a 0–100 scale.
    pub confidence: f64,
}

impl MatchedShow {
    pub fn from_candidate(candidate: &ShowCandidate, confidence: f64) -> Self {
        Self {
            external_id: candidate.external_id,
            name: candidate.name.clone(),
            kind: candidate.kind.clone(),
            poster_url: candidate.poster_url.clone(),
            confidence,
        }
    }
}

/// A season together with its episode list, as fetched from the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonEntry {
    pub season: CatalogSeason,
    pub episodes: Vec<CatalogEpisode>,
}

/// Everything needed to persist a show in one unit of work.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowHierarchy {
    pub show: MatchedShow,
    pub seasons: Vec<SeasonEntry>,
}

impl ShowHierarchy {
    pub fn episode_count(&self) -> usize {
        self.seasons.iter().map(|s| s.episodes.len()).sum()
    }
}

// ── Stored rows ─────────────────────────────────────────────────────────────

/// A show row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Show {
    pub id: i64,
    pub external_id: i64,
    pub name: String,
    pub poster_url: Option<String>,
    pub cached_poster_path: Option<String>,
}

/// A season row. Unique per `(show_id, season_number)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    pub id: i64,
    pub show_id: i64,
    pub season_number: u32,
    pub poster_url: Option<String>,
    pub cached_poster_path: Option<String>,
}

/// An episode row. Unique per `(season_id, episode_number)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Episode {
    pub id: i64,
    pub season_id: i64,
    pub episode_number: u32,
    pub name: String,
    pub airdate: Option<String>,
    pub summary: Option<String>,
    pub poster_url: Option<String>,
    pub cached_poster_path: Option<String>,
}

/// A local video file, optionally linked to one episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    pub id: i64,
    pub path: String,
    pub episode_id: Option<i64>,
}
