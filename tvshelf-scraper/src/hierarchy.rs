use tvshelf_catalog::types::{MatchedShow, SeasonEntry, ShowHierarchy};

use crate::catalog::CatalogService;
use crate::error::CatalogError;

/// Fetch every season and its episodes for a matched show.
///
/// `on_season` is called with each season number before its episodes are
/// requested. Nothing is returned unless every call succeeds, so a partial
/// hierarchy never reaches storage.
pub fn fetch_hierarchy(
    catalog: &dyn CatalogService,
    show: &MatchedShow,
    mut on_season: impl FnMut(u32),
) -> Result<ShowHierarchy, CatalogError> {
    let seasons = catalog.list_seasons(show.external_id)?;
    let mut entries = Vec::with_capacity(seasons.len());

    for season in seasons {
        on_season(season.number);
        let episodes = catalog.list_episodes(season.season_id)?;
        entries.push(SeasonEntry { season, episodes });
    }

    Ok(ShowHierarchy {
        show: show.clone(),
        seasons: entries,
    })
}
