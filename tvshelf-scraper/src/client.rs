use std::time::Duration;

use serde::de::DeserializeOwned;
use tvshelf_catalog::types::{CatalogEpisode, CatalogSeason, ShowCandidate};

use crate::catalog::CatalogService;
use crate::error::CatalogError;
use crate::types::{EpisodeInfo, SearchHit, SeasonInfo};

pub const BASE_URL: &str = "https://api.tvmaze.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking HTTP client for the TVMaze API.
///
/// Does no rate limiting of its own; wrap it in a
/// [`ThrottledCatalog`](crate::throttle::ThrottledCatalog).
pub struct TvMazeClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl TvMazeClient {
    pub fn new(timeout: Duration) -> Result<Self, CatalogError> {
        Self::with_base_url(BASE_URL, timeout)
    }

    /// Point the client at another host (a mirror or a local stub).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tvshelf/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("GET {}", url);

        let resp = self.http.get(&url).query(query).send()?;
        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(CatalogError::RateLimited);
        }
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let text = resp.text()?;
        serde_json::from_str(&text).map_err(|e| {
            let snippet: String = text.chars().take(200).collect();
            CatalogError::Malformed(format!("{e}. Response: {snippet}"))
        })
    }
}

impl CatalogService for TvMazeClient {
    fn search_shows(&self, name: &str) -> Result<Vec<ShowCandidate>, CatalogError> {
        let hits: Vec<SearchHit> = self.get_json("/search/shows", &[("q", name)])?;
        Ok(hits.into_iter().map(|hit| hit.show.into()).collect())
    }

    fn list_seasons(&self, external_id: i64) -> Result<Vec<CatalogSeason>, CatalogError> {
        let seasons: Vec<SeasonInfo> =
            self.get_json(&format!("/shows/{external_id}/seasons"), &[])?;
        Ok(seasons.into_iter().filter_map(SeasonInfo::into_catalog).collect())
    }

    fn list_episodes(&self, season_id: i64) -> Result<Vec<CatalogEpisode>, CatalogError> {
        let episodes: Vec<EpisodeInfo> =
            self.get_json(&format!("/seasons/{season_id}/episodes"), &[])?;
        Ok(episodes.into_iter().filter_map(EpisodeInfo::into_catalog).collect())
    }

    fn download_image(&self, url: &str) -> Result<Vec<u8>, CatalogError> {
        let resp = self.http.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.bytes()?.to_vec())
    }
}
