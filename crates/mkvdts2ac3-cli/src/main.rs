//! Command line front end for mkvdts2ac3.
//!
//! Parses flags, merges them with the persisted settings into one
//! [`RunOptions`] value, validates the combination, and hands the file list
//! to the batch driver. Exit status: 2 for usage and pre-flight errors, 1
//! when any file failed, 0 otherwise.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use mkvdts2ac3_core::config::{ConfigManager, RunOptions, Settings};
use mkvdts2ac3_core::logging;
use mkvdts2ac3_core::orchestrator::run_batch;

/// Convert DTS audio tracks inside Matroska files to AC-3.
#[derive(Parser, Debug)]
#[command(name = "mkvdts2ac3", version, about, long_about = None)]
struct Args {
    /// Convert every DTS track, not just the first
    #[arg(short = 'a', long = "all")]
    select_all: bool,

    /// Custom name for the new AC-3 track
    #[arg(short = 'c', long = "custom", value_name = "TITLE")]
    custom_title: Option<String>,

    /// Mark the new AC-3 track as the default audio track
    #[arg(short = 'd', long = "default")]
    mark_default: bool,

    /// Write standalone AC-3 files next to the original; leave the MKV untouched
    #[arg(short = 'e', long = "external")]
    keep_external: bool,

    /// Process files that already contain an AC-3 track
    #[arg(short = 'f', long = "force")]
    force: bool,

    /// Place the new AC-3 tracks first in the file
    #[arg(short = 'i', long = "initial")]
    initial_order: bool,

    /// Retain the extracted DTS file (implies --no-dts)
    #[arg(short = 'k', long = "keep")]
    keep_dts: bool,

    /// Do not retain converted DTS tracks in the remuxed file
    #[arg(short = 'n', long = "no-dts")]
    no_dts: bool,

    /// Write <name>.new.mkv next to the original instead of replacing it
    #[arg(long = "new")]
    adjacent_file: bool,

    /// Niceness priority for this process and the tools it spawns
    #[arg(short = 'p', value_name = "PRIORITY", default_value_t = 0, allow_hyphen_values = true)]
    niceness: i32,

    /// Convert exactly this track id
    #[arg(short = 't', long = "track", value_name = "ID")]
    track_id: Option<u64>,

    /// Working directory for intermediate track files
    #[arg(short = 'w', long = "wd", value_name = "DIR")]
    working_dir: Option<PathBuf>,

    /// Extra -flag=value argument for the AC-3 encoder (repeatable)
    #[arg(short = 'A', value_name = "FLAG=VALUE", allow_hyphen_values = true)]
    custom_encode_args: Vec<String>,

    /// Extra -flag=value argument for the DTS decoder (repeatable)
    #[arg(short = 'D', value_name = "FLAG=VALUE", allow_hyphen_values = true)]
    custom_decode_args: Vec<String>,

    /// Print the commands that would run without executing anything
    #[arg(long = "test")]
    dry_run: bool,

    /// Pause for confirmation before each external command
    #[arg(long = "debug")]
    step_confirm: bool,

    /// Monochrome terminal output
    #[arg(short = 'm', long = "no-color")]
    no_color: bool,

    /// Output nothing to the terminal
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,

    /// Show debug-level detail
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Alternate configuration file
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Matroska files to convert
    #[arg(value_name = "FILE", required = true)]
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    if !args.quiet {
        println!("mkvdts2ac3 {}", mkvdts2ac3_core::version());
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(ConfigManager::default_path);
    let mut config = ConfigManager::new(&config_path);
    config
        .load_or_create()
        .with_context(|| format!("could not load configuration from {}", config_path.display()))?;

    let opts = build_options(&args, config.settings());
    let warnings = opts.validate()?;

    let _log_guard = logging::init_tracing(log_filter(&opts), opts.color, opts.job_log_dir.as_deref());

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    apply_niceness(opts.niceness);

    let summary = run_batch(&args.files, &opts);

    tracing::info!(
        "{} file(s) converted, {} skipped, {} failed",
        summary.converted(),
        summary.skipped(),
        summary.failed()
    );

    Ok(if summary.failed() > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

/// Merge CLI flags over persisted settings. Flags win where both exist.
fn build_options(args: &Args, settings: &Settings) -> RunOptions {
    let tool_timeout = match settings.conversion.tool_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let job_log_dir = settings
        .logging
        .job_logs
        .then(|| PathBuf::from(&settings.logging.directory));

    RunOptions {
        select_all: args.select_all,
        track_id: args.track_id,
        custom_title: args.custom_title.clone(),
        mark_default: args.mark_default,
        keep_external: args.keep_external,
        force: args.force,
        initial_order: args.initial_order,
        keep_dts: args.keep_dts,
        no_dts: args.no_dts,
        adjacent_file: args.adjacent_file,
        niceness: args.niceness,
        working_dir: args
            .working_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(&settings.conversion.working_dir)),
        custom_decode_args: args.custom_decode_args.clone(),
        custom_encode_args: args.custom_encode_args.clone(),
        dry_run: args.dry_run,
        step_confirm: args.step_confirm,
        color: !args.no_color,
        quiet: args.quiet,
        verbose: args.verbose,
        tools: settings.tools.clone(),
        tool_timeout,
        job_log_dir,
    }
}

fn log_filter(opts: &RunOptions) -> &'static str {
    if opts.quiet {
        "off"
    } else if opts.verbose {
        "debug"
    } else {
        "info"
    }
}

/// Renice the process; child tools inherit the adjusted priority.
fn apply_niceness(niceness: i32) {
    if niceness == 0 {
        return;
    }
    let adjusted = unsafe { libc::nice(niceness) };
    if adjusted == -1 {
        tracing::warn!("niceness adjustment to {} may have failed", niceness);
    } else {
        tracing::debug!("process niceness set to {}", adjusted);
    }
}
