use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::formats::Format;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> io::Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    // @generates: Output path for a converted subtitle
    // @params: input_file, output_dir, format
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        format: Format,
    ) -> PathBuf {
        let stem = input_file.as_ref().file_stem().unwrap_or_default();

        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(format.extension());

        output_dir.as_ref().join(output_filename)
    }

    /// Find every file under `dir` with a known subtitle extension
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            let known = path
                .extension()
                .and_then(|ext| Format::from_extension(&ext.to_string_lossy()))
                .is_some();
            if path.is_file() && known {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Write a string to a file, creating parent directories
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }
        fs::write(&path, content)
    }

    /// Guess the format of a subtitle from its extension and content
    ///
    /// `.sub` is shared by SubViewer and MicroDVD, so the first non-blank line decides.
    /// Unknown extensions fall back to sniffing the content.
    pub fn detect_format<P: AsRef<Path>>(path: P, content: &str) -> Option<Format> {
        let by_extension = path
            .as_ref()
            .extension()
            .and_then(|ext| Format::from_extension(&ext.to_string_lossy()));

        match by_extension {
            Some(Format::SubViewer) => Some(if Self::first_line(content).starts_with('{') {
                Format::MicroDvd
            } else {
                Format::SubViewer
            }),
            Some(format) => Some(format),
            None => Self::sniff_format(content),
        }
    }

    fn first_line(content: &str) -> &str {
        content
            .trim_start_matches('\u{feff}')
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .unwrap_or_default()
    }

    /// Guess the format from content alone
    pub fn sniff_format(content: &str) -> Option<Format> {
        let first = Self::first_line(content);
        let upper = first.to_uppercase();

        if upper.starts_with("WEBVTT") {
            Some(Format::WebVtt)
        } else if upper.starts_with("<SAMI") {
            Some(Format::Sami)
        } else if first.starts_with("[Script Info]") {
            if content.contains("[V4+ Styles]") {
                Some(Format::Ass)
            } else {
                Some(Format::Ssa)
            }
        } else if first.starts_with('{') {
            Some(Format::MicroDvd)
        } else if first.starts_with('[') {
            Some(Format::SubViewer)
        } else if first.parse::<usize>().is_ok() {
            Some(Format::Srt)
        } else {
            None
        }
    }
}
