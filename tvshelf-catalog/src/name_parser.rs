//! Parser for episode filenames and library folder names.
//!
//! Episode files are expected to carry an `SxxEyy` marker somewhere in the
//! file stem. The show name is taken from the folder layout when possible:
//! ```text
//! Breaking Bad/Season 1/Breaking.Bad.S01E01.Pilot.mkv
//! Breaking Bad Season 2/bb.s02e03.mkv
//! ```
//! and from the filename itself (`Show.Name.S01E02`) otherwise. Anything
//! without a marker is treated as a movie.

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Parsed classification of a video filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedFilename {
    /// A TV episode with its season/episode numbers and a show-name hint.
    Episode {
        show_name: String,
        season: u32,
        episode: u32,
    },
    /// Anything that does not look like an episode.
    Movie { title: String },
}

impl ParsedFilename {
    pub fn is_episode(&self) -> bool {
        matches!(self, ParsedFilename::Episode { .. })
    }
}

static EPISODE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)s(\d+)e(\d+)").expect("static pattern"));

static NAMED_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.+?)\.s(\d+)e(\d+)").expect("static pattern"));

static SEASON_FOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:season\s*\d+.*|s\d+|s\d+\s*-\s*s?\d+)$").expect("static pattern")
});

static SEASON_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[\s\-]*season\s*\d+\s*$").expect("static pattern"));

/// Parse a video file into an episode or movie classification.
///
/// `stem` is the filename without extension; `path` is the full path, whose
/// ancestor folders are consulted for the show name.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use tvshelf_catalog::name_parser::{parse_filename, ParsedFilename};
///
/// let path = Path::new("/tv/Breaking Bad/Season 1/Breaking.Bad.S01E02.mkv");
/// let parsed = parse_filename("Breaking.Bad.S01E02", path);
/// assert_eq!(
///     parsed,
///     ParsedFilename::Episode { show_name: "Breaking Bad".into(), season: 1, episode: 2 }
/// );
///
/// let parsed = parse_filename("Heat (1995)", Path::new("/movies/Heat (1995).mkv"));
/// assert!(!parsed.is_episode());
/// ```
pub fn parse_filename(stem: &str, path: &Path) -> ParsedFilename {
    if let Some((season, episode)) = EPISODE_MARKER
        .captures(stem)
        .and_then(|caps| episode_numbers(&caps, 1))
    {
        if let Some(show_name) = show_name_from_path(path) {
            return ParsedFilename::Episode {
                show_name,
                season,
                episode,
            };
        }
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(stem);
    if let Some(caps) = NAMED_EPISODE.captures(file_name) {
        if let Some((season, episode)) = episode_numbers(&caps, 2) {
            let show_name = normalize_show_name(&caps[1]);
            if !show_name.is_empty() {
                return ParsedFilename::Episode {
                    show_name,
                    season,
                    episode,
                };
            }
        }
    }

    ParsedFilename::Movie {
        title: stem.to_string(),
    }
}

/// Check if a folder name denotes a single season (or season range) of a show.
///
/// Matches `Season 1`, `season01`, `S1`, `S01`, `S01-02`, `S01-S03`
/// case-insensitively.
pub fn is_season_folder(name: &str) -> bool {
    SEASON_FOLDER.is_match(name.trim())
}

/// Normalize a folder or filename fragment into a show name.
///
/// Dots and underscores become spaces, a trailing "Season N" is stripped,
/// and whitespace is collapsed.
pub fn normalize_show_name(raw: &str) -> String {
    let spaced: String = raw
        .chars()
        .map(|c| if c == '.' || c == '_' { ' ' } else { c })
        .collect();
    let stripped = SEASON_SUFFIX.replace(&spaced, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ── Internal parsing ────────────────────────────────────────────────────────

/// Extract (season, episode) from the capture groups starting at `first_group`.
fn episode_numbers(caps: &Captures<'_>, first_group: usize) -> Option<(u32, u32)> {
    let season = caps.get(first_group)?.as_str().parse::<u32>().ok()?;
    let episode = caps.get(first_group + 1)?.as_str().parse::<u32>().ok()?;
    Some((season, episode))
}

/// Walk the file's ancestors looking for a season folder; its parent names the
/// show. Falls back to the immediate parent directory.
fn show_name_from_path(path: &Path) -> Option<String> {
    let parent = path.parent()?;

    for dir in parent.ancestors() {
        let Some(name) = dir.file_name().and_then(|n| n.to_str()) else {
            break;
        };
        if is_season_folder(name) {
            let show_name = dir
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .map(normalize_show_name)
                .unwrap_or_default();
            if !show_name.is_empty() {
                return Some(show_name);
            }
            break;
        }
    }

    let immediate = parent.file_name()?.to_str()?;
    let show_name = normalize_show_name(immediate);
    if show_name.is_empty() {
        None
    } else {
        Some(show_name)
    }
}
