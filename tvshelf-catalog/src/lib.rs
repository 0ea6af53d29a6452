//! TV catalog data model types and episode filename parsing.
//!
//! This crate defines the show/season/episode model without any database
//! or network dependencies. Consumers can use these types directly for
//! display, or pass them to `tvshelf-db` for persistence.

pub mod name_parser;
pub mod types;

pub use name_parser::{is_season_folder, normalize_show_name, parse_filename, ParsedFilename};
pub use types::*;
