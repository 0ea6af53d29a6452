//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tvshelf")]
#[command(about = "Identify TV show folders and index their episodes", long_about = None)]
pub(crate) struct Cli {
    /// Metadata database to use (overrides the settings file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging (timestamps + debug-level messages)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write log output to a file (ANSI codes stripped)
    #[arg(long, global = true)]
    pub logfile: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Arguments for the scan command.
#[derive(Args, Clone)]
pub(crate) struct ScanArgs {
    /// Folders to scan
    #[arg(required = true)]
    pub folders: Vec<PathBuf>,

    /// Treat each folder as a library root and scan its show subfolders
    #[arg(short, long)]
    pub children: bool,

    /// Treat ambiguous matches as no match instead of asking
    #[arg(short, long)]
    pub silent: bool,

    /// Only accept close name matches (score 80 instead of 60)
    #[arg(long)]
    pub exact: bool,

    /// Do not download show and season posters
    #[arg(long)]
    pub no_posters: bool,

    /// List ambiguous folders at the end instead of prompting for a choice
    #[arg(long)]
    pub no_prompt: bool,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Identify show folders and store their episodes
    Scan(ScanArgs),

    /// List the shows in the database
    Shows,

    /// Show the seasons and episodes of one show
    Show {
        /// Catalog id of the show (see `tvshelf shows`)
        external_id: i64,
    },

    /// Show which episode a video file is linked to
    Video {
        /// Path of the video file
        path: PathBuf,
    },

    /// Show how a video filename is interpreted
    Parse {
        /// Video file paths
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print database row counts
    Stats,

    /// Remove all shows, seasons, and episodes but keep known video files
    Clear {
        /// Actually perform the deletion
        #[arg(long)]
        confirm: bool,
    },

    /// Remove everything from the database
    Reset {
        /// Actually perform the deletion
        #[arg(long)]
        confirm: bool,
    },

    /// Inspect the settings file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Show the effective settings
    Show,

    /// Write the effective settings to the settings file
    Init,

    /// Print the settings file path
    Path,
}
