use std::path::Path;

use tvshelf_catalog::name_parser::{
    is_season_folder, normalize_show_name, parse_filename, ParsedFilename,
};

fn episode(show_name: &str, season: u32, episode: u32) -> ParsedFilename {
    ParsedFilename::Episode {
        show_name: show_name.to_string(),
        season,
        episode,
    }
}

fn parse(path: &str) -> ParsedFilename {
    let path = Path::new(path);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap();
    parse_filename(stem, path)
}

#[test]
fn show_name_from_season_folder_parent() {
    let p = parse("/tv/Breaking Bad/Season 1/Breaking.Bad.S01E02.720p.mkv");
    assert_eq!(p, episode("Breaking Bad", 1, 2));
}

#[test]
fn season_folder_deeper_than_parent() {
    let p = parse("/tv/The Wire/S02/extras/the.wire.s02e05.mkv");
    assert_eq!(p, episode("The Wire", 2, 5));
}

#[test]
fn falls_back_to_immediate_parent() {
    let p = parse("/tv/Cobra_Kai/cobra kai s03e10.mp4");
    assert_eq!(p, episode("Cobra Kai", 3, 10));
}

#[test]
fn strips_season_suffix_from_parent() {
    let p = parse("/tv/Doctor Who Season 4/dw.S04E01.avi");
    assert_eq!(p, episode("Doctor Who", 4, 1));
}

#[test]
fn lowercase_marker_anywhere_in_stem() {
    let p = parse("/tv/Severance/[group] severance - s01e09 - the we we are.mkv");
    assert_eq!(p, episode("Severance", 1, 9));
}

#[test]
fn leading_zeros_are_ignored() {
    let p = parse("/tv/Lost/Season 01/Lost.S001E0007.mkv");
    assert_eq!(p, episode("Lost", 1, 7));
}

#[test]
fn name_from_filename_when_no_parent() {
    let p = parse("Better.Call.Saul.S05E03.mkv");
    assert_eq!(p, episode("Better Call Saul", 5, 3));
}

#[test]
fn movie_without_marker() {
    let p = parse("/movies/Heat (1995)/Heat.1995.1080p.mkv");
    assert_eq!(
        p,
        ParsedFilename::Movie {
            title: "Heat.1995.1080p".to_string()
        }
    );
    assert!(!p.is_episode());
}

#[test]
fn bare_marker_without_any_name_is_movie() {
    let p = parse("S01E01.mkv");
    assert!(!p.is_episode());
}

#[test]
fn overflowing_numbers_are_not_episodes() {
    let p = parse("Show.S99999999999E01.mkv");
    assert!(!p.is_episode());
}

#[test]
fn season_folder_names() {
    for name in ["Season 2", "season02", "SEASON 10", "S1", "s01", "S01-02", "S01 - S03"] {
        assert!(is_season_folder(name), "{name} should be a season folder");
    }
}

#[test]
fn non_season_folder_names() {
    for name in ["Breaking Bad", "Seasons of Love", "Specials", "S01E01", "Sopranos"] {
        assert!(!is_season_folder(name), "{name} should not be a season folder");
    }
}

#[test]
fn normalize_collapses_separators() {
    assert_eq!(normalize_show_name("The.Office_US"), "The Office US");
    assert_eq!(normalize_show_name("  Fargo   Season 3 "), "Fargo");
    assert_eq!(normalize_show_name("Fargo - Season 3"), "Fargo");
}
