use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use tvshelf_lib::Settings;
use tvshelf_lib::settings::settings_path;

use crate::CliError;

/// Show the effective settings and where they come from.
pub(crate) fn run_config_show(settings: &Settings) -> Result<(), CliError> {
    let path = settings_path();

    log::info!(
        "{}",
        "tvshelf Configuration".if_supports_color(Stdout, |t| t.bold()),
    );
    crate::log_blank();

    if path.exists() {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(exists)".if_supports_color(Stdout, |t| t.green()),
        );
    } else {
        log::info!(
            "  Settings file: {} {}",
            path.display().if_supports_color(Stdout, |t| t.cyan()),
            "(not found, using defaults)".if_supports_color(Stdout, |t| t.dimmed()),
        );
    }
    crate::log_blank();

    log::info!("  Database:           {}", settings.database_path().display());
    log::info!("  Poster cache:       {}", settings.poster_cache_dir().display());
    log::info!("  Download posters:   {}", settings.download_posters);
    log::info!("  Require exact:      {}", settings.require_exact_match);
    log::info!("  Request interval:   {} ms", settings.request_interval_ms);
    log::info!("  Request timeout:    {} s", settings.request_timeout_secs);
    log::info!("  Video extensions:   {}", settings.video_extensions.join(", "));

    Ok(())
}

/// Write the effective settings to the settings file.
pub(crate) fn run_config_init(settings: &Settings) -> Result<(), CliError> {
    let path = settings_path();
    settings
        .save_to(&path)
        .map_err(|e| CliError::config(format!("Failed to write {}: {}", path.display(), e)))?;

    log::info!(
        "{} Settings written to {}",
        "\u{2714}".if_supports_color(Stdout, |t| t.green()),
        path.display(),
    );
    Ok(())
}

/// Print the settings file path.
pub(crate) fn run_config_path() -> Result<(), CliError> {
    log::info!("{}", settings_path().display());
    Ok(())
}
