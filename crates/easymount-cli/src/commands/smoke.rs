//! Smoke command - mount a tmpfs, write and read a file, unmount.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use easymount::smoke;
use tracing::instrument;

use super::probe::probe_options;
use crate::config::Config;
use crate::output::print_json;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Mountpoint to use [default: <probe dir>/quick_test]
    pub dir: Option<PathBuf>,

    /// Mount source
    #[arg(long, default_value = "tmpfs")]
    pub source: String,

    /// Filesystem type [default: tmpfs]
    #[arg(short = 't', long = "type", value_name = "FSTYPE")]
    pub fstype: Option<String>,

    /// Filesystem options [default: size=5M]
    #[arg(short = 'o', long, value_name = "OPTIONS")]
    pub data: Option<String>,

    /// Keep the mountpoint directory afterwards
    #[arg(long)]
    pub keep: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[instrument(level = "info", name = "cmd::smoke", skip_all)]
pub fn execute(args: &Args, config: &Config) -> Result<()> {
    let opts = probe_options(
        None,
        &args.source,
        args.fstype.as_ref(),
        args.data.as_ref(),
        args.keep,
        config,
    );
    let dir = args
        .dir
        .clone()
        .unwrap_or_else(|| opts.base_dir.join("quick_test"));

    let report = smoke(&dir, &opts)
        .with_context(|| format!("Smoke test failed at {}", dir.display()))?;

    if args.json {
        return print_json(&report);
    }

    println!("Mounted {} at {}", opts.fstype, report.mountpoint.display());
    if let Some(entry) = &report.entry {
        println!("Mount options: {}", entry.options.join(","));
    }
    println!("Wrote {} and read back: {}", report.file.display(), report.content);
    println!("Unmounted {}", report.mountpoint.display());
    Ok(())
}
