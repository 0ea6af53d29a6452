use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use tvshelf_lib::Settings;

use super::existing_store;
use crate::CliError;

/// Print row counts for the metadata database.
pub(crate) fn run_stats(settings: &Settings) -> Result<(), CliError> {
    let Some(store) = existing_store(settings)? else {
        return Ok(());
    };

    let counts = store
        .counts()
        .map_err(|e| CliError::database(format!("Failed to query database stats: {}", e)))?;

    log::info!(
        "{}",
        "Metadata Database Statistics".if_supports_color(Stdout, |t| t.bold()),
    );
    log::info!("  Database: {}", settings.database_path().display());
    crate::log_blank();
    log::info!("  Shows:          {:>8}", counts.shows);
    log::info!("  Seasons:        {:>8}", counts.seasons);
    log::info!("  Episodes:       {:>8}", counts.episodes);
    log::info!("  Videos:         {:>8}", counts.videos);
    log::info!(
        "  Linked videos:  {:>8} ({} unlinked)",
        counts.linked_videos,
        counts.videos - counts.linked_videos,
    );

    Ok(())
}

/// Remove the show hierarchy; video rows stay with their links cleared.
pub(crate) fn run_clear(settings: &Settings, confirm: bool) -> Result<(), CliError> {
    if !confirm {
        log::warn!(
            "This will delete every show, season, and episode from:\n  {}",
            settings.database_path().display(),
        );
        log::info!("Re-run with --confirm to proceed:");
        log::info!("  tvshelf clear --confirm");
        return Ok(());
    }

    let Some(store) = existing_store(settings)? else {
        return Ok(());
    };
    store
        .clear_show_metadata()
        .map_err(|e| CliError::database(format!("Failed to clear show metadata: {}", e)))?;

    log::info!(
        "{} Show metadata cleared",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
    );
    Ok(())
}

/// Remove everything from the database.
pub(crate) fn run_reset(settings: &Settings, confirm: bool) -> Result<(), CliError> {
    if !confirm {
        log::warn!(
            "This will permanently delete all data in:\n  {}",
            settings.database_path().display(),
        );
        log::info!("Re-run with --confirm to proceed:");
        log::info!("  tvshelf reset --confirm");
        return Ok(());
    }

    let Some(store) = existing_store(settings)? else {
        return Ok(());
    };
    store
        .reset_all()
        .map_err(|e| CliError::database(format!("Failed to reset database: {}", e)))?;

    log::info!(
        "{} Database reset",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
    );
    crate::log_blank();
    log::info!("Run 'tvshelf scan <folder>' to rebuild.");
    Ok(())
}
