use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::formats::Format;
use crate::session::EditSession;
use crate::subtitle_processor::{self, Document};
use crate::transforms::{self, Selection, Transform};
use crate::validation::{TimecodeReport, TimecodeValidator};

// @module: Application controller for subtitle commands

/// Counts reported after a folder conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub converted: Vec<PathBuf>,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller behind the CLI commands
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn open_session(&self, input: &Path, from: Option<Format>) -> Result<EditSession> {
        let mut session = EditSession::with_history_limit(self.config.history_limit);
        session.set_codec_options(self.config.codecs);
        session
            .open(input, from)
            .with_context(|| format!("Failed to open subtitle file: {}", input.display()))?;
        Ok(session)
    }

    fn load(&self, input: &Path, from: Option<Format>) -> Result<(Document, Format)> {
        subtitle_processor::load_file_with(input, from, &self.config.codecs)
            .with_context(|| format!("Failed to load subtitle file: {}", input.display()))
    }

    fn save(&self, output: &Path, document: &Document, format: Format) -> Result<()> {
        subtitle_processor::save_file_with(output, document, format, &self.config.codecs)
            .with_context(|| format!("Failed to write subtitle file: {}", output.display()))
    }

    // @returns: Explicit format, else the one implied by the output extension, else `fallback`
    fn format_for(output: Option<&Path>, to: Option<Format>, fallback: Format) -> Format {
        to.or_else(|| {
            output
                .and_then(Path::extension)
                .and_then(|ext| Format::from_extension(&ext.to_string_lossy()))
        })
        .unwrap_or(fallback)
    }

    fn output_format(&self, output: Option<&Path>, to: Option<Format>) -> Format {
        Self::format_for(output, to, self.config.default_format)
    }

    /// Convert a file, or every subtitle file under a directory
    pub fn convert(
        &self,
        input: &Path,
        output: Option<&Path>,
        from: Option<Format>,
        to: Option<Format>,
        force_overwrite: bool,
    ) -> Result<ConversionSummary> {
        if FileManager::dir_exists(input) {
            return self.convert_folder(input, output, from, to, force_overwrite);
        }
        if !FileManager::file_exists(input) {
            return Err(anyhow!("Input path does not exist: {:?}", input));
        }

        let format = self.output_format(output, to);
        let output_path = match output {
            Some(path) => path.to_path_buf(),
            None => FileManager::generate_output_path(input, input.parent().unwrap_or(Path::new(".")), format),
        };

        if output_path.as_path() == input {
            return Err(anyhow!("Output would overwrite the input file: {:?}", input));
        }
        if output_path.exists() && !force_overwrite {
            warn!("Skipping {}, output already exists (use -f to force overwrite)", output_path.display());
            return Ok(ConversionSummary {
                skipped: 1,
                ..ConversionSummary::default()
            });
        }

        let converted = self.convert_file(input, &output_path, from, format)?;
        Ok(ConversionSummary {
            converted: vec![converted],
            ..ConversionSummary::default()
        })
    }

    fn convert_file(&self, input: &Path, output: &Path, from: Option<Format>, to: Format) -> Result<PathBuf> {
        let (document, source_format) = self.load(input, from)?;
        self.save(output, &document, to)?;

        info!("Converted {} ({}) -> {} ({})", input.display(), source_format, output.display(), to);
        Ok(output.to_path_buf())
    }

    /// Convert every subtitle file found under `input_dir`
    ///
    /// Outputs go next to each input unless `output_dir` is given. Existing outputs are
    /// skipped unless `force_overwrite` is set; a file that would overwrite itself is always skipped.
    pub fn convert_folder(
        &self,
        input_dir: &Path,
        output_dir: Option<&Path>,
        from: Option<Format>,
        to: Option<Format>,
        force_overwrite: bool,
    ) -> Result<ConversionSummary> {
        let start_time = std::time::Instant::now();
        let format = to.unwrap_or(self.config.default_format);

        let files = FileManager::find_subtitle_files(input_dir)
            .with_context(|| format!("Failed to scan directory: {}", input_dir.display()))?;
        if files.is_empty() {
            return Err(anyhow!("No subtitle files found in directory: {:?}", input_dir));
        }

        let progress_bar = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));

        let mut summary = ConversionSummary::default();
        for file in &files {
            let file_name = file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            progress_bar.set_message(format!("Converting: {}", file_name));

            let target_dir = output_dir
                .map(Path::to_path_buf)
                .or_else(|| file.parent().map(Path::to_path_buf))
                .unwrap_or_else(|| input_dir.to_path_buf());
            let output_path = FileManager::generate_output_path(file, &target_dir, format);

            if output_path == *file || (output_path.exists() && !force_overwrite) {
                debug!("Skipping {}", file.display());
                summary.skipped += 1;
            } else {
                match self.convert_file(file, &output_path, from, format) {
                    Ok(path) => summary.converted.push(path),
                    Err(e) => {
                        error!("Error converting {}: {:#}", file_name, e);
                        summary.failed += 1;
                    }
                }
            }

            progress_bar.inc(1);
        }
        progress_bar.finish_with_message("Conversion complete");

        info!(
            "Folder conversion completed in {:.1}s: {} converted, {} skipped, {} errors",
            start_time.elapsed().as_secs_f64(),
            summary.converted.len(),
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    /// Parse transform specifications using the configured defaults
    pub fn parse_operations(&self, operations: &[String]) -> Result<Vec<Transform>> {
        operations
            .iter()
            .map(|op| {
                Transform::parse_with_defaults(op, &self.config.transforms)
                    .with_context(|| format!("Invalid operation: {}", op))
            })
            .collect()
    }

    /// Apply operations in order and write the result
    ///
    /// Every operation is parsed before the file is opened, so a typo leaves nothing written.
    pub fn edit(
        &self,
        input: &Path,
        output: &Path,
        operations: &[String],
        selection: Option<&str>,
        to: Option<Format>,
    ) -> Result<Document> {
        let transforms = self.parse_operations(operations)?;
        if transforms.is_empty() {
            return Err(anyhow!("No operations given"));
        }
        // `edit` writes a single document, so the detached tail would be lost
        if transforms.iter().any(|t| matches!(t, Transform::SplitAtIndex { .. })) {
            return Err(anyhow!("split-at produces two documents; use the `split` command instead"));
        }
        let selection = selection
            .map(str::parse::<Selection>)
            .transpose()
            .context("Invalid selection")?;

        let mut session = self.open_session(input, None)?;
        for transform in &transforms {
            let outcome = session
                .apply(transform, selection.as_ref())
                .with_context(|| format!("Failed to apply {}", transform))?;
            info!("{}: {} cue(s) affected", transform.name(), outcome.touched);
        }

        let format = to.unwrap_or_else(|| self.output_format(Some(output), None));
        session
            .save_as(output, format)
            .with_context(|| format!("Failed to write subtitle file: {}", output.display()))?;

        Ok(session.document().clone())
    }

    /// Append each of `others` after `first` and write the result
    pub fn merge(&self, first: &Path, others: &[PathBuf], output: &Path, to: Option<Format>) -> Result<Document> {
        let (mut document, first_format) = self.load(first, None)?;

        for other in others {
            let (secondary, _) = self.load(other, None)?;
            let outcome = transforms::apply(&mut document, &Transform::MergeDocuments { secondary }, None)
                .with_context(|| format!("Failed to merge {}", other.display()))?;
            debug!("Merged {} cues from {}", outcome.touched, other.display());
        }

        let format = Self::format_for(Some(output), to, first_format);
        self.save(output, &document, format)?;

        info!("Merged {} file(s) into {} ({} cues)", others.len() + 1, output.display(), document.len());
        Ok(document)
    }

    /// Split a file at `position` into a head and a tail rebased to zero
    pub fn split(&self, input: &Path, position: usize, head: &Path, tail: &Path) -> Result<(Document, Document)> {
        let (mut document, format) = self.load(input, None)?;

        let outcome = transforms::apply(&mut document, &Transform::SplitAtIndex { position }, None)
            .with_context(|| format!("Cannot split {} at {}", input.display(), position))?;
        let detached = outcome
            .detached
            .ok_or_else(|| anyhow!("Split produced no tail document"))?;

        self.save(head, &document, Self::format_for(Some(head), None, format))?;
        self.save(tail, &detached, Self::format_for(Some(tail), None, format))?;

        info!("Split {} into {} + {} cues", input.display(), document.len(), detached.len());
        Ok((document, detached))
    }

    /// Run the timing checks on a file
    pub fn check(&self, input: &Path) -> Result<TimecodeReport> {
        let (document, _) = self.load(input, None)?;
        let report = TimecodeValidator::with_config(self.config.validation.clone()).validate(&document);

        if report.passed() {
            info!("{}: {} cues, no timing problems", input.display(), document.len());
        } else {
            warn!("{}: {} issue(s) in {} cue(s)", input.display(), report.total_issues(), report.cues.len());
        }
        Ok(report)
    }

    /// Render a file as SRT text or as JSON
    pub fn show(&self, input: &Path, json: bool) -> Result<String> {
        let (document, format) = self.load(input, None)?;
        debug!("Showing {} cues decoded as {}", document.len(), format);

        if json {
            serde_json::to_string_pretty(&document).context("Failed to serialize document to JSON")
        } else {
            Ok(document.to_string())
        }
    }
}
