//! Video file discovery.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Extensions treated as video files when none are configured.
pub const DEFAULT_VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi"];

/// Build a lowercase extension set. Leading dots are ignored.
pub fn extension_set<S: AsRef<str>>(extensions: &[S]) -> HashSet<String> {
    extensions
        .iter()
        .map(|e| e.as_ref().trim_start_matches('.').to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

/// Check if a path has an extension in the allowed set.
pub fn has_matching_extension(path: &Path, extensions: &HashSet<String>) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase()))
        .unwrap_or(false)
}

/// Find every video file under `folder`, recursively, sorted by path.
///
/// Unreadable entries are skipped.
pub fn find_video_files(folder: &Path, extensions: &HashSet<String>) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && has_matching_extension(e.path(), extensions))
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}

/// Count video files directly inside `folder` (not recursive).
pub fn count_direct_videos(folder: &Path, extensions: &HashSet<String>) -> std::io::Result<usize> {
    let count = std::fs::read_dir(folder)?
        .flatten()
        .filter(|e| {
            let path = e.path();
            path.is_file() && has_matching_extension(&path, extensions)
        })
        .count();
    Ok(count)
}

/// Check if `folder` contains at least one video file at any depth.
pub fn contains_videos(folder: &Path, extensions: &HashSet<String>) -> bool {
    WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .any(|e| e.file_type().is_file() && has_matching_extension(e.path(), extensions))
}

/// Check if a file or folder name is hidden (dot-prefixed).
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

#[cfg(test)]
#[path = "tests/scanner_tests.rs"]
mod tests;
