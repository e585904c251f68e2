/*!
 * Common test utilities for the subforge test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;

use subforge::{Cue, Document};

static INIT_LOGGING: Once = Once::new();

/// Route library logs through env_logger, honoring RUST_LOG
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// SRT text of [`sample_document`]
pub const SAMPLE_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains
multiple lines.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.

";

/// Creates a sample subtitle file for testing
pub fn create_test_subtitle(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, SAMPLE_SRT)
}

/// Three cues, numbered 1..=3, with millisecond-exact times
pub fn sample_document() -> Document {
    Document::from_cues(vec![
        Cue::from_millis(1, 1000, 4000, "This is a test subtitle."),
        Cue::from_millis(2, 5000, 9000, "It contains\nmultiple lines."),
        Cue::from_millis(3, 10000, 14000, "For testing purposes."),
    ])
}

/// Build a document from `(start_ms, end_ms, text)` triples, numbered from 1
pub fn document_from(rows: &[(i64, i64, &str)]) -> Document {
    Document::from_cues(
        rows.iter()
            .enumerate()
            .map(|(i, &(start, end, text))| Cue::from_millis(i + 1, start, end, text))
            .collect(),
    )
}

/// `(start_ms, end_ms)` of every cue
pub fn bounds(document: &Document) -> Vec<(i64, i64)> {
    document
        .iter()
        .map(|cue| (cue.start.as_millis(), cue.end.as_millis()))
        .collect()
}
