/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use std::path::PathBuf;
use subforge::file_utils::FileManager;
use subforge::formats::Format;

use crate::common;

/// Test file existence checks
#[test]
fn test_file_exists_withExistingAndMissingFiles_shouldDetectCorrectly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let file = common::create_test_subtitle(temp_dir.path(), "movie.srt")?;

    assert!(FileManager::file_exists(&file));
    assert!(!FileManager::file_exists(temp_dir.path().join("missing.srt")));
    assert!(!FileManager::file_exists(temp_dir.path()));
    assert!(FileManager::dir_exists(temp_dir.path()));
    Ok(())
}

/// Test output path generation for every format
#[test]
fn test_generate_output_path_withEachFormat_shouldUseFormatExtension() {
    let expected = [
        (Format::Srt, "show.srt"),
        (Format::SubViewer, "show.sub"),
        (Format::MicroDvd, "show.sub"),
        (Format::Sami, "show.smi"),
        (Format::Ssa, "show.ssa"),
        (Format::Ass, "show.ass"),
        (Format::WebVtt, "show.vtt"),
    ];

    for (format, name) in expected {
        let path = FileManager::generate_output_path("/input/show.srt", "/output", format);
        assert_eq!(path, PathBuf::from("/output").join(name));
    }
}

/// Test recursive discovery of subtitle files
#[test]
fn test_find_subtitle_files_withNestedDirs_shouldReturnSortedSubtitlesOnly() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_file(temp_dir.path(), "b.vtt", "WEBVTT\n")?;
    common::create_test_file(temp_dir.path(), "season1/a.srt", "")?;
    common::create_test_file(temp_dir.path(), "season1/readme.md", "")?;
    common::create_test_file(temp_dir.path(), "season1/c.SMI", "")?;

    let files = FileManager::find_subtitle_files(temp_dir.path())?;

    let names: Vec<String> = files
        .iter()
        .map(|f| f.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["b.vtt", "season1/a.srt", "season1/c.SMI"]);
    Ok(())
}

/// Test format detection from extension and content
#[test]
fn test_detect_format_withAmbiguousOrUnknownExtension_shouldSniffContent() {
    assert_eq!(FileManager::detect_format("x.sub", "{10}{20}Hi"), Some(Format::MicroDvd));
    assert_eq!(FileManager::detect_format("x.sub", "00:00:01.00,00:00:02.00\nHi"), Some(Format::SubViewer));
    assert_eq!(FileManager::detect_format("x.txt", "WEBVTT\n\n"), Some(Format::WebVtt));
    assert_eq!(FileManager::detect_format("x.ass", ""), Some(Format::Ass));
    assert_eq!(FileManager::detect_format("x.txt", "just words"), None);
}

/// Test writing into a directory tree that does not exist yet
#[test]
fn test_write_to_file_withMissingParents_shouldCreateThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("out/nested/file.vtt");

    FileManager::write_to_file(&path, "WEBVTT\n")?;

    assert_eq!(std::fs::read_to_string(&path)?, "WEBVTT\n");
    Ok(())
}
