//! Mount command - one `mount(2)` call built from flags and intents.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use easymount::{easy, MountError, MountFlags, MountRequest};
use tracing::instrument;

use crate::config::Config;
use crate::output::print_json;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Mount source (device, directory, or `none`)
    pub source: String,

    /// Directory to mount on
    pub target: PathBuf,

    /// Filesystem type (defaults to the config value, else empty)
    #[arg(short = 't', long = "type", value_name = "FSTYPE")]
    pub fstype: Option<String>,

    /// Mount flags by name, comma separated (e.g. RDONLY,NOSUID)
    #[arg(short, long, value_name = "FLAGS")]
    pub flags: Option<MountFlags>,

    /// Add one flag by intent name (e.g. read-only, no-execute); repeatable
    #[arg(short, long = "intent", value_name = "NAME")]
    pub intents: Vec<String>,

    /// Filesystem-specific options (e.g. size=5M)
    #[arg(short = 'o', long, value_name = "OPTIONS")]
    pub data: Option<String>,

    /// Create the target directory if it does not exist
    #[arg(long)]
    pub mkdir: bool,

    /// Print the request without performing it
    #[arg(long)]
    pub dry_run: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[instrument(level = "info", name = "cmd::mount", skip_all, fields(target = %args.target.display()))]
pub fn execute(args: &Args, config: &Config) -> Result<()> {
    let request = build_request(args, config)?;

    if args.dry_run {
        return report(&request, false, args.json);
    }

    if args.mkdir && !request.target().exists() {
        std::fs::create_dir_all(request.target()).with_context(|| {
            format!("Failed to create mountpoint {}", request.target().display())
        })?;
    }

    request.perform().with_context(|| {
        format!(
            "Failed to mount {} on {}",
            request.source_name(),
            request.target().display()
        )
    })?;

    report(&request, true, args.json)
}

/// Combine arguments and config defaults into a request.
pub fn build_request(args: &Args, config: &Config) -> Result<MountRequest> {
    let mut flags = args.flags.unwrap_or_default();
    for name in &args.intents {
        flags |= easy::mount_intent(name).ok_or_else(|| MountError::UnknownFlag(name.clone()))?;
    }

    let fstype = args
        .fstype
        .clone()
        .or_else(|| config.defaults.fstype.clone())
        .unwrap_or_default();
    let data = args
        .data
        .clone()
        .or_else(|| config.defaults.data.clone())
        .unwrap_or_default();

    Ok(MountRequest::new(&args.target)
        .source(&args.source)
        .fstype(fstype)
        .flags(flags)
        .data(data))
}

fn report(request: &MountRequest, mounted: bool, json: bool) -> Result<()> {
    if json {
        return print_json(&serde_json::json!({
            "request": request,
            "mounted": mounted,
        }));
    }

    let verb = if mounted { "Mounted" } else { "Would mount" };
    println!(
        "{verb} {} on {} (type {}, flags {}, data {})",
        request.source_name(),
        request.target().display(),
        display_or_none(request.fstype_name()),
        request.mount_flags(),
        request.data_str().unwrap_or("(none)"),
    );
    Ok(())
}

fn display_or_none(s: &str) -> &str {
    if s.is_empty() { "(none)" } else { s }
}
