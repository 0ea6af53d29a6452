//! tvshelf CLI
//!
//! Command-line interface for identifying TV show folders and indexing their
//! episodes in a local metadata database.

mod cli_types;
mod commands;
mod error;
mod spinner;

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use clap::Parser;
use log::LevelFilter;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use tvshelf_lib::Settings;
use tvshelf_lib::settings::settings_path;

use cli_types::{Cli, Commands, ConfigAction};
pub(crate) use error::CliError;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.quiet, cli.verbose, cli.logfile.as_deref()) {
        eprintln!("Failed to open log file: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        log::error!("{} {}", "\u{2718}".if_supports_color(Stdout, |t| t.red()), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut settings = Settings::load().map_err(|e| {
        CliError::config(format!("Failed to load {}: {}", settings_path().display(), e))
    })?;
    if let Some(db) = cli.db {
        settings.database_path = Some(db);
    }

    match cli.command {
        Commands::Scan(args) => commands::scan::run_scan(&settings, args, cli.quiet),
        Commands::Shows => commands::shows::run_shows(&settings),
        Commands::Show { external_id } => commands::shows::run_show(&settings, external_id),
        Commands::Video { path } => commands::shows::run_video(&settings, &path),
        Commands::Parse { paths } => {
            commands::parse::run_parse(&paths);
            Ok(())
        }
        Commands::Stats => commands::maintenance::run_stats(&settings),
        Commands::Clear { confirm } => commands::maintenance::run_clear(&settings, confirm),
        Commands::Reset { confirm } => commands::maintenance::run_reset(&settings, confirm),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::run_config_show(&settings),
            ConfigAction::Init => commands::config::run_config_init(&settings),
            ConfigAction::Path => commands::config::run_config_path(),
        },
    }
}

/// Print an empty line through the logger so it honours `--quiet`.
pub(crate) fn log_blank() {
    log::info!("");
}

// ── Logging ─────────────────────────────────────────────────────────────────

/// Install the global logger.
///
/// Normal runs print bare messages at info level, with the library crates
/// held to warnings since the commands render their progress themselves.
/// `--verbose` adds timestamps and debug output from every crate. `RUST_LOG`
/// directives are applied last.
fn init_logging(quiet: bool, verbose: bool, logfile: Option<&Path>) -> io::Result<()> {
    let mut builder = env_logger::Builder::new();

    if verbose {
        builder.filter_level(LevelFilter::Debug);
        builder.format(|buf, record| {
            writeln!(
                buf,
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        });
    } else {
        let level = if quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        };
        builder.filter_level(level);
        for library in ["tvshelf_lib", "tvshelf_scraper", "tvshelf_db"] {
            builder.filter_module(library, LevelFilter::Warn);
        }
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
    }

    builder.parse_env(env_logger::Env::default());

    match logfile {
        Some(path) => {
            let file = File::create(path)?;
            builder.target(env_logger::Target::Pipe(Box::new(TeeWriter { file })));
        }
        None => {
            builder.target(env_logger::Target::Stdout);
        }
    }

    builder.init();
    Ok(())
}

/// Writes log output to stdout and, without colour codes, to a log file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.file.write_all(&strip_ansi_escapes::strip(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.file.flush()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scan_flags_and_global_db() {
        let cli = Cli::parse_from([
            "tvshelf", "scan", "/tv", "/more-tv", "--children", "--silent", "--db", "/tmp/x.db",
        ]);
        assert_eq!(cli.db.as_deref(), Some(Path::new("/tmp/x.db")));
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.folders.len(), 2);
        assert!(args.children && args.silent);
        assert!(!args.exact && !args.no_posters && !args.no_prompt);
    }

    #[test]
    fn scan_requires_a_folder() {
        assert!(Cli::try_parse_from(["tvshelf", "scan"]).is_err());
    }
}
