//! Probe command - try each mount flag, then each unmount intent, on a
//! scratch tmpfs and summarize.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args as ClapArgs, ColorChoice};
use comfy_table::{Cell, Color};
use easymount::{
    probe_flag, probe_unmount_all, MountFlags, ProbeKind, ProbeOptions, ProbeOutcome, ProbeResult,
};
use tracing::instrument;

use crate::config::Config;
use crate::output::{create_table, format_hex, print_json};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Parent directory for the per-flag mountpoints [default: /mnt]
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Mount source
    #[arg(long, default_value = "none")]
    pub source: String,

    /// Filesystem type [default: tmpfs]
    #[arg(short = 't', long = "type", value_name = "FSTYPE")]
    pub fstype: Option<String>,

    /// Filesystem options [default: size=5M]
    #[arg(short = 'o', long, value_name = "OPTIONS")]
    pub data: Option<String>,

    /// Only probe these flags (comma separated names)
    #[arg(long, value_name = "FLAGS")]
    pub only: Option<MountFlags>,

    /// Skip the unmount intents (force, detach, expire)
    #[arg(long)]
    pub skip_unmount: bool,

    /// Keep the mountpoint directories afterwards
    #[arg(long)]
    pub keep: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Turn arguments and config defaults into probe options.
pub fn probe_options(
    base_dir: Option<&PathBuf>,
    source: &str,
    fstype: Option<&String>,
    data: Option<&String>,
    keep: bool,
    config: &Config,
) -> ProbeOptions {
    let defaults = ProbeOptions::default();
    ProbeOptions {
        base_dir: base_dir
            .or(config.defaults.probe_dir.as_ref())
            .cloned()
            .unwrap_or(defaults.base_dir),
        source: source.to_string(),
        fstype: fstype
            .or(config.defaults.fstype.as_ref())
            .cloned()
            .unwrap_or(defaults.fstype),
        data: data
            .or(config.defaults.data.as_ref())
            .cloned()
            .or(defaults.data),
        cleanup: !keep,
    }
}

#[instrument(level = "info", name = "cmd::probe", skip_all)]
pub fn execute(args: &Args, config: &Config, color: ColorChoice, quiet: bool) -> Result<()> {
    let opts = probe_options(
        args.base_dir.as_ref(),
        &args.source,
        args.fstype.as_ref(),
        args.data.as_ref(),
        args.keep,
        config,
    );
    let selected = args.only.unwrap_or_else(MountFlags::all);

    if !args.json && !quiet {
        eprintln!(
            "Probing {} flag(s) with {} mounts under {}",
            selected.iter_names().count(),
            opts.fstype,
            opts.base_dir.display()
        );
    }

    let mut results: Vec<ProbeResult> = selected
        .iter_names()
        .map(|(name, flag)| probe_flag(name, flag, &opts))
        .collect();
    if !args.skip_unmount {
        results.extend(probe_unmount_all(&opts));
    }

    if args.json {
        return print_json(&results);
    }

    print_summary(&results, color, quiet);
    Ok(())
}

fn print_summary(results: &[ProbeResult], color: ColorChoice, quiet: bool) {
    let mut table = create_table(color);
    table.set_header(vec!["Call", "Flag", "Value", "Result", "Detail"]);

    for result in results {
        let (status, detail) = match &result.outcome {
            ProbeOutcome::Success => (Cell::new("SUCCESS").fg(Color::Green), String::new()),
            ProbeOutcome::Failed { errno, message } => (
                Cell::new("FAILED").fg(Color::Red),
                format!("errno {errno}: {message}"),
            ),
            ProbeOutcome::Error { message } => {
                (Cell::new("ERROR").fg(Color::Yellow), message.clone())
            }
        };
        table.add_row(vec![
            Cell::new(call_name(result.kind)),
            Cell::new(&result.flag_name),
            Cell::new(format_hex(result.flag_value)),
            status,
            Cell::new(detail),
        ]);
    }

    println!("{table}");

    if !quiet {
        let succeeded = results.iter().filter(|r| r.outcome.is_success()).count();
        eprintln!("\n{succeeded}/{} probe(s) succeeded.", results.len());
    }
}

fn call_name(kind: ProbeKind) -> &'static str {
    match kind {
        ProbeKind::Mount => "mount",
        ProbeKind::Unmount => "umount2",
    }
}
