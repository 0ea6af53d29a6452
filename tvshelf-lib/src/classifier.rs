//! Folder heuristics applied before any catalog lookup.
//!
//! A library usually looks like
//! ```text
//! TV/                      <- container
//!   Breaking Bad/          <- show
//!     Season 1/            <- season
//!       Breaking.Bad.S01E01.mkv
//! ```
//! Only show folders are worth a catalog search.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tvshelf_catalog::is_season_folder;

use crate::scanner::{contains_videos, count_direct_videos, find_video_files, is_hidden};

/// A folder with this many direct videos or more is a show folder even if
/// it also has subfolders with videos.
pub const CONTAINER_DIRECT_VIDEO_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FolderKind {
    Show,
    /// A single season (or season range) of a show.
    Season,
    /// Aggregates several show folders, e.g. a library root.
    Container,
}

/// Classify a folder by its name and contents.
pub fn classify_folder(folder: &Path, extensions: &HashSet<String>) -> std::io::Result<FolderKind> {
    let name = folder.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if is_season_folder(name) {
        return Ok(FolderKind::Season);
    }
    if is_container_folder(folder, extensions)? {
        return Ok(FolderKind::Container);
    }
    Ok(FolderKind::Show)
}

/// A folder is a container when at least one non-hidden subfolder holds
/// videos and it has fewer than [`CONTAINER_DIRECT_VIDEO_LIMIT`] videos of
/// its own.
pub fn is_container_folder(folder: &Path, extensions: &HashSet<String>) -> std::io::Result<bool> {
    let direct = count_direct_videos(folder, extensions)?;
    if direct >= CONTAINER_DIRECT_VIDEO_LIMIT {
        return Ok(false);
    }

    let has_video_subfolder = std::fs::read_dir(folder)?
        .flatten()
        .map(|e| e.path())
        .any(|p| p.is_dir() && !is_hidden(&p) && contains_videos(&p, extensions));
    Ok(has_video_subfolder)
}

/// A candidate show folder found under a library root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowFolder {
    pub path: PathBuf,
    pub name: String,
    /// Videos anywhere under the folder.
    pub video_count: usize,
}

/// List the immediate, non-hidden subfolders of `root` that hold video files
/// at any depth, sorted by name.
pub fn discover_show_folders(
    root: &Path,
    extensions: &HashSet<String>,
) -> std::io::Result<Vec<ShowFolder>> {
    let mut folders = Vec::new();

    for entry in std::fs::read_dir(root)?.flatten() {
        let path = entry.path();
        if !path.is_dir() || is_hidden(&path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()).map(str::to_string) else {
            continue;
        };
        let video_count = find_video_files(&path, extensions).len();
        if video_count > 0 {
            folders.push(ShowFolder {
                path,
                name,
                video_count,
            });
        }
    }

    folders.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(folders)
}

#[cfg(test)]
#[path = "tests/classifier_tests.rs"]
mod tests;
