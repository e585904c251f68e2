// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use subforge::app_config::{self, Config};
use subforge::app_controller::Controller;
use subforge::file_utils::FileManager;
use subforge::formats::Format;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert a subtitle file, or every subtitle file in a directory, to another format
    Convert {
        /// Input subtitle file or directory
        #[arg(value_name = "INPUT_PATH")]
        input: PathBuf,

        /// Output file, or output directory when the input is a directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source format (detected from extension and content when omitted)
        #[arg(long)]
        from: Option<Format>,

        /// Target format (taken from the output extension or the config when omitted)
        #[arg(long)]
        to: Option<Format>,

        /// Force overwrite of existing output files
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// Apply one or more transforms and write the result
    Edit {
        /// Input subtitle file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Transform to apply, e.g. `shift=-1500`, `fix-gaps`, `case=title` (repeatable)
        #[arg(long = "op", required = true)]
        operations: Vec<String>,

        /// Zero-based cue positions to restrict selection-aware transforms to, e.g. `0,3,5`
        #[arg(long = "select")]
        selection: Option<String>,

        /// Target format
        #[arg(long)]
        to: Option<Format>,
    },

    /// Append documents one after another
    Merge {
        /// First document
        first: PathBuf,

        /// Documents appended after the first, in order
        #[arg(required = true)]
        others: Vec<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Target format
        #[arg(long)]
        to: Option<Format>,
    },

    /// Split a document in two at a cue position
    Split {
        /// Input subtitle file
        input: PathBuf,

        /// Position of the first cue of the tail
        #[arg(long)]
        at: usize,

        /// Output file for the cues before the split
        #[arg(long)]
        head: PathBuf,

        /// Output file for the cues from the split on, rebased to zero
        #[arg(long)]
        tail: PathBuf,
    },

    /// Report timing problems and the transforms that repair them
    Check {
        /// Input subtitle file
        input: PathBuf,
    },

    /// Print a document as SRT text or JSON
    Show {
        /// Input subtitle file
        input: PathBuf,

        /// Print JSON instead of SRT text
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions for subforge
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subforge - subtitle conversion and editing
///
/// Reads and writes SRT, SubViewer, MicroDVD, SAMI, SSA, ASS and WebVTT, and applies
/// timing, structure and text transforms.
#[derive(Parser, Debug)]
#[command(name = "subforge")]
#[command(version)]
#[command(about = "Subtitle conversion and editing tool")]
#[command(long_about = "subforge converts subtitles between formats and edits them.

EXAMPLES:
    subforge convert movie.srt --to webvtt             # Write movie.vtt next to movie.srt
    subforge convert /subs --to ass                    # Convert a whole directory
    subforge edit in.srt -o out.srt --op shift=-1500   # Shift every cue 1.5s earlier
    subforge edit in.srt -o out.srt --op fix-overlaps --op fix-gaps
    subforge edit in.srt -o out.srt --op case=upper --select 0,3,5
    subforge merge part1.srt part2.srt -o full.srt
    subforge split full.srt --at 120 --head a.srt --tail b.srt
    subforge check movie.srt
    subforge show movie.ass --json
    subforge completions bash > subforge.bash

CONFIGURATION:
    Configuration is stored in subforge.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", global = true, default_value = "subforge.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // The logger filters on the global max level, which is lowered or raised once
    // the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subforge", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level).to_level_filter());
    }

    let config = load_or_create_config(&cli.config_path, cli.log_level)?;
    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    run_command(&controller, cli.command)
}

// @returns: Config from `config_path`, or a freshly written default one
fn load_or_create_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if FileManager::file_exists(config_path) {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let mut config = Config::default();
        if let Some(level) = log_level {
            config.log_level = level.into();
        }
        config
            .save(config_path)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    // Command line wins over the file
    if let Some(level) = log_level {
        config.log_level = level.into();
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

fn run_command(controller: &Controller, command: Commands) -> Result<()> {
    match command {
        Commands::Convert {
            input,
            output,
            from,
            to,
            force_overwrite,
        } => {
            let summary = controller.convert(&input, output.as_deref(), from, to, force_overwrite)?;
            for path in &summary.converted {
                info!("Success: {}", path.display());
            }
            if summary.failed > 0 {
                anyhow::bail!("{} file(s) failed to convert", summary.failed);
            }
        }
        Commands::Edit {
            input,
            output,
            operations,
            selection,
            to,
        } => {
            let document = controller.edit(&input, &output, &operations, selection.as_deref(), to)?;
            info!("Wrote {} cues to {}", document.len(), output.display());
        }
        Commands::Merge {
            first,
            others,
            output,
            to,
        } => {
            controller.merge(&first, &others, &output, to)?;
        }
        Commands::Split { input, at, head, tail } => {
            controller.split(&input, at, &head, &tail)?;
        }
        Commands::Check { input } => {
            let report = controller.check(&input)?;
            for cue in &report.cues {
                for issue in &cue.issues {
                    println!("#{} (position {}): {}", cue.index, cue.position, issue);
                }
            }
            let suggestions = report.suggested_transforms();
            if !suggestions.is_empty() {
                println!("Suggested: {}", suggestions.iter().map(|s| format!("--op {}", s)).collect::<Vec<_>>().join(" "));
            }
            if !report.passed() {
                anyhow::bail!("{} timing issue(s) found", report.total_issues());
            }
        }
        Commands::Show { input, json } => {
            print!("{}", controller.show(&input, json)?);
            if json {
                println!();
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
