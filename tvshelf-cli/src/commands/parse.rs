use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use tvshelf_catalog::name_parser::{parse_filename, ParsedFilename};

/// Show how each path would be interpreted during a scan.
pub(crate) fn run_parse(paths: &[PathBuf]) {
    for path in paths {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        match parse_filename(&stem, path) {
            ParsedFilename::Episode {
                show_name,
                season,
                episode,
            } => log::info!(
                "{} {} S{:02}E{:02}",
                path.display().if_supports_color(Stdout, |t| t.bold()),
                show_name.if_supports_color(Stdout, |t| t.cyan()),
                season,
                episode,
            ),
            ParsedFilename::Movie { title } => log::info!(
                "{} {} {}",
                path.display().if_supports_color(Stdout, |t| t.bold()),
                "not an episode:".if_supports_color(Stdout, |t| t.dimmed()),
                title,
            ),
        }
    }
}
