//! TVMaze wire types and their conversion into catalog types.

use serde::Deserialize;
use tvshelf_catalog::types::{CatalogEpisode, CatalogSeason, ShowCandidate};

/// One hit from `/search/shows`.
#[derive(Debug, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub score: Option<f64>,
    pub show: ShowInfo,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShowInfo {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub image: Option<ImageLinks>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ImageLinks {
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonInfo {
    pub id: i64,
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub image: Option<ImageLinks>,
}

#[derive(Debug, Deserialize)]
pub struct EpisodeInfo {
    #[serde(default)]
    pub number: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub airdate: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub image: Option<ImageLinks>,
}

fn medium_image(image: &Option<ImageLinks>) -> Option<String> {
    image.as_ref().and_then(|i| i.medium.clone())
}

impl From<ShowInfo> for ShowCandidate {
    fn from(show: ShowInfo) -> Self {
        ShowCandidate {
            poster_url: medium_image(&show.image),
            external_id: show.id,
            name: show.name,
            kind: show.kind,
        }
    }
}

impl SeasonInfo {
    /// Seasons without a number cannot be keyed and are dropped.
    pub fn into_catalog(self) -> Option<CatalogSeason> {
        Some(CatalogSeason {
            season_id: self.id,
            number: self.number?,
            poster_url: medium_image(&self.image),
        })
    }
}

impl EpisodeInfo {
    /// Specials come back without a number; episodes without a name are
    /// placeholders. Both are dropped.
    pub fn into_catalog(self) -> Option<CatalogEpisode> {
        let poster_url = medium_image(&self.image);
        Some(CatalogEpisode {
            number: self.number?,
            name: self.name?,
            airdate: self.airdate.filter(|d| !d.is_empty()),
            summary: self.summary.filter(|s| !s.is_empty()),
            poster_url,
        })
    }
}
