use std::path::Path;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use tvshelf_lib::Settings;

use super::{existing_store, truncate};
use crate::CliError;

/// List every show with its season and episode counts.
pub(crate) fn run_shows(settings: &Settings) -> Result<(), CliError> {
    let Some(store) = existing_store(settings)? else {
        return Ok(());
    };

    let shows = store
        .get_all_shows()
        .map_err(|e| CliError::database(format!("Failed to list shows: {}", e)))?;
    if shows.is_empty() {
        log::info!(
            "{}",
            "No shows in the database.".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    }

    log::info!(
        "{}",
        format!("{} show(s):", shows.len()).if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    for show in &shows {
        let seasons = store
            .get_seasons_for_show(show.id)
            .map_err(|e| CliError::database(format!("Failed to list seasons: {}", e)))?;
        let mut episodes = 0;
        for season in &seasons {
            episodes += store
                .get_episodes_for_season(season.id)
                .map_err(|e| CliError::database(format!("Failed to list episodes: {}", e)))?
                .len();
        }

        log::info!(
            "  {:<40} {} {}",
            truncate(&show.name, 40).if_supports_color(Stdout, |t| t.bold()),
            format!("[{}]", show.external_id).if_supports_color(Stdout, |t| t.cyan()),
            format!("{} seasons, {} episodes", seasons.len(), episodes)
                .if_supports_color(Stdout, |t| t.dimmed()),
        );
    }

    Ok(())
}

/// Print a show's seasons and episodes, marking episodes that have a video.
pub(crate) fn run_show(settings: &Settings, external_id: i64) -> Result<(), CliError> {
    let Some(store) = existing_store(settings)? else {
        return Ok(());
    };

    let show = store
        .get_show_by_external_id(external_id)
        .map_err(|e| CliError::database(format!("Failed to look up show: {}", e)))?
        .ok_or_else(|| CliError::other(format!("No show with catalog id {}.", external_id)))?;

    log::info!(
        "{} {}",
        show.name.if_supports_color(Stdout, |t| t.bold()),
        format!("[{}]", show.external_id).if_supports_color(Stdout, |t| t.cyan()),
    );
    if let Some(poster) = &show.cached_poster_path {
        log::info!("  Poster: {}", poster);
    }

    let seasons = store
        .get_seasons_for_show(show.id)
        .map_err(|e| CliError::database(format!("Failed to list seasons: {}", e)))?;

    for season in &seasons {
        crate::log_blank();
        log::info!(
            "  {}",
            format!("Season {}", season.season_number).if_supports_color(Stdout, |t| t.bold()),
        );

        let episodes = store
            .get_episodes_for_season(season.id)
            .map_err(|e| CliError::database(format!("Failed to list episodes: {}", e)))?;
        for episode in &episodes {
            let video = store
                .get_video_for_episode(episode.id)
                .map_err(|e| CliError::database(format!("Failed to look up video: {}", e)))?;
            let marker = if video.is_some() {
                "\u{2714}".if_supports_color(Stdout, |t| t.green()).to_string()
            } else {
                " ".to_string()
            };
            log::info!(
                "    {} {:>3}. {} {}",
                marker,
                episode.episode_number,
                truncate(&episode.name, 50),
                episode
                    .airdate
                    .as_deref()
                    .unwrap_or("")
                    .if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    }

    Ok(())
}

/// Report which episode a video file is linked to.
pub(crate) fn run_video(settings: &Settings, path: &Path) -> Result<(), CliError> {
    let Some(store) = existing_store(settings)? else {
        return Ok(());
    };

    let path = std::path::absolute(path)?;
    let key = path.to_string_lossy();
    let video = store
        .get_video_by_path(&key)
        .map_err(|e| CliError::database(format!("Failed to look up video: {}", e)))?;

    let Some(video) = video else {
        log::info!(
            "{} {}",
            path.display(),
            "(not in database)".if_supports_color(Stdout, |t| t.dimmed()),
        );
        return Ok(());
    };

    let location = match video.episode_id {
        Some(episode_id) => store
            .get_episode_location(episode_id)
            .map_err(|e| CliError::database(format!("Failed to look up episode: {}", e)))?,
        None => None,
    };

    log::info!("{}", video.path.if_supports_color(Stdout, |t| t.bold()));
    match location {
        Some(location) => {
            log::info!(
                "  {} S{:02}E{:02} {}",
                location.show.name.if_supports_color(Stdout, |t| t.cyan()),
                location.season_number,
                location.episode.episode_number,
                location.episode.name,
            );
            if let Some(airdate) = &location.episode.airdate {
                log::info!("  Aired: {}", airdate);
            }
            if let Some(summary) = &location.episode.summary {
                log::info!("  {}", truncate(summary, 200));
            }
        }
        None => {
            log::info!(
                "  {}",
                "Not linked to an episode.".if_supports_color(Stdout, |t| t.dimmed()),
            );
        }
    }

    Ok(())
}
