// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use log::{error, debug, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use utoolkit::app_config::{Config, LogLevel};
use utoolkit::app_controller::Controller;
use utoolkit::cover::CoverOptions;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process a cover image
    Cover(CoverArgs),

    /// Process subtitles
    Sub(SubArgs),

    /// Generate shell completions for utoolkit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct CoverArgs {
    /// Input image file
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output file path [default: cover.jpg]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of an existing output file
    #[arg(short, long)]
    force: bool,

    /// Output format extension [default: jpeg]
    #[arg(short, long)]
    extension: Option<String>,

    /// Keep the original ratio, fitting inside the reference size
    #[arg(short, long)]
    keep: bool,

    /// Reference width [default: 1146]
    #[arg(long)]
    width: Option<u32>,

    /// Reference height [default: 717]
    #[arg(long)]
    height: Option<u32>,

    /// Add black padding up to the reference size
    #[arg(short, long)]
    padding: bool,
}

#[derive(Args, Debug)]
struct SubArgs {
    /// Input subtitle file, or a directory of VTT files
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output file path [default: input with .ass extension]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force: bool,

    /// Remove events shorter than this many milliseconds [default: 100]
    #[arg(short = 't', long = "duration", value_name = "DURATION_MS")]
    duration: Option<i64>,
}

/// utoolkit - toolkit for processing youtube files
#[derive(Parser, Debug)]
#[command(name = "utoolkit")]
#[command(version)]
#[command(about = "Toolkit for processing youtube files")]
#[command(long_about = "utoolkit resizes cover images and cleans up auto-generated subtitles.

EXAMPLES:
    utoolkit cover thumb.png                    # Resize to 1146x717 cover.jpg
    utoolkit cover -k -p thumb.png -o out.png -e png
    utoolkit sub video.en.vtt                   # Write video.en.ass
    utoolkit -v sub -t 200 -f video.en.vtt      # Drop events under 200ms, overwrite
    utoolkit sub ./downloads/                   # Convert every .vtt in a directory
    utoolkit completions bash > utoolkit.bash

CONFIGURATION:
    Defaults can be set in utoolkit.json (see --config). A missing file
    means built-in defaults; command-line flags always win.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "utoolkit.json", global = true)]
    config_path: PathBuf,
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

    // @returns: ANSI color for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[38;5;196m",
            Level::Warn => "\x1B[38;5;226m",
            Level::Info => "\x1B[38;5;39m",
            Level::Debug | Level::Trace => "\x1B[38;21m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level.min(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<8}: {}\x1B[0m",
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

fn main() -> ExitCode {
    // The backend accepts everything; the max level set per invocation filters
    if let Err(e) = CustomLogger::init(LevelFilter::Trace) {
        eprintln!("Failed to initialize logger: {}", e);
        return ExitCode::FAILURE;
    }
    log::set_max_level(LevelFilter::Warn);

    let cli = CommandLineOptions::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: CommandLineOptions) -> Result<()> {
    if cli.verbose > 0 {
        log::set_max_level(LogLevel::from_verbosity(cli.verbose).to_level_filter());
    }

    let config = Config::load(&cli.config_path)?;
    config.validate().context("Configuration validation failed")?;

    if cli.verbose == 0 {
        log::set_max_level(config.log_level.to_level_filter());
    }
    debug!("Using configuration: {:?}", config);

    let controller = Controller::with_config(config);

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "utoolkit", &mut std::io::stdout());
        }
        Commands::Cover(args) => {
            let options = cover_options(&args, &controller.config().cover.options);
            controller.run_cover(&args.file, args.output.as_deref(), Some(options), args.force)?;
        }
        Commands::Sub(args) => {
            controller.run_subtitles(&args.file, args.output.as_deref(), args.duration, args.force)?;
        }
    }

    Ok(())
}

// @merges: Command-line cover flags over configured defaults
fn cover_options(args: &CoverArgs, defaults: &CoverOptions) -> CoverOptions {
    CoverOptions {
        width: args.width.unwrap_or(defaults.width),
        height: args.height.unwrap_or(defaults.height),
        keep: args.keep || defaults.keep,
        padding: args.padding || defaults.padding,
        extension: args.extension.clone().unwrap_or_else(|| defaults.extension.clone()),
    }
}
