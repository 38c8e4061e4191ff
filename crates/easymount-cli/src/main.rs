#![deny(unsafe_code)]

mod commands;
mod config;
mod exit_code;
mod output;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ColorChoice, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use easymount::MountError;

use crate::commands::{completions, flags, mount, mounts, probe, smoke, umount};
use crate::config::Config;

/// Friendly wrappers for Linux mount and umount
#[derive(Parser)]
#[command(name = "easymount")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # Mount a 16M tmpfs without setuid or device files
    easymount mount none /mnt/scratch -t tmpfs -o size=16M -i no-set-uid -i no-device

    # Same thing with flag names
    easymount mount none /mnt/scratch -t tmpfs -o size=16M --flags NOSUID,NODEV

    # Lazy unmount
    easymount umount --lazy /mnt/scratch

    # Which flags does this kernel accept on tmpfs?
    sudo easymount probe
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// When to use colored output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    color: ColorChoice,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mount a filesystem
    Mount(mount::Args),

    /// Unmount a filesystem
    #[command(alias = "unmount")]
    Umount(umount::Args),

    /// List mount or unmount flag names and values
    Flags(flags::Args),

    /// Show the current mount table
    Mounts(mounts::Args),

    /// Try every mount flag on a scratch filesystem (requires root)
    Probe(probe::Args),

    /// Mount a tmpfs, write and read back a file, then unmount (requires root)
    Smoke(smoke::Args),

    /// Generate shell completions
    Completions(completions::Args),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(e) => {
            let code = categorize_error(&e);

            let is_quiet = std::env::args().any(|a| a == "-q" || a == "--quiet");
            if !is_quiet {
                eprintln!("Error: {e:#}");
            }

            ExitCode::from(code)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    if !cli.quiet {
        let verbose = if cli.verbose > 0 {
            cli.verbose
        } else {
            config.defaults.verbosity.unwrap_or(0)
        };
        setup_tracing(verbose);
    }

    match cli.command {
        Commands::Mount(args) => mount::execute(&args, &config),
        Commands::Umount(args) => umount::execute(&args, cli.quiet),
        Commands::Flags(args) => flags::execute(&args, cli.color),
        Commands::Mounts(args) => mounts::execute(&args, cli.color),
        Commands::Probe(args) => probe::execute(&args, &config, cli.color, cli.quiet),
        Commands::Smoke(args) => smoke::execute(&args, &config),
        Commands::Completions(args) => completions::execute(&args),
    }
}

/// Set up tracing/logging based on verbosity level
fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();
}

/// Map an error chain to an exit code by downcasting to known error types.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(mount_err) = cause.downcast_ref::<MountError>() {
            if matches!(mount_err, MountError::UnknownFlag(_)) {
                return exit_code::USAGE_ERROR;
            }
            if mount_err.is_permission_denied() {
                return exit_code::PERMISSION_DENIED;
            }
            if mount_err.is_not_found() {
                return exit_code::NOT_FOUND;
            }
            return exit_code::MOUNT_FAILED;
        }

        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::PermissionDenied => return exit_code::PERMISSION_DENIED,
                io::ErrorKind::NotFound => return exit_code::NOT_FOUND,
                _ => {}
            }
        }
    }

    exit_code::GENERAL_ERROR
}
