//! Mounts command - list the kernel mount table.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, ColorChoice};
use comfy_table::{Cell, Color};
use easymount::{read_mount_table, MountEntry};
use tracing::instrument;

use crate::output::{create_table, print_json};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Only show mounts of this filesystem type
    #[arg(short = 't', long = "type", value_name = "FSTYPE")]
    pub fstype: Option<String>,

    /// Only show mounts at or below this directory
    #[arg(long, value_name = "DIR")]
    pub under: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[instrument(level = "info", name = "cmd::mounts", skip_all)]
pub fn execute(args: &Args, color: ColorChoice) -> Result<()> {
    let entries = read_mount_table().context("Failed to read the mount table")?;
    let entries = filter_entries(entries, args);

    if args.json {
        return print_json(&entries);
    }

    if entries.is_empty() {
        eprintln!("No matching mounts.");
        return Ok(());
    }

    let mut table = create_table(color);
    table.set_header(vec!["Source", "Mountpoint", "Type", "Options"]);
    for entry in &entries {
        let options = entry.options.join(",");
        let options_cell = if entry.is_read_only() {
            Cell::new(options).fg(Color::Yellow)
        } else {
            Cell::new(options)
        };
        table.add_row(vec![
            Cell::new(&entry.source),
            Cell::new(entry.mountpoint.display()),
            Cell::new(&entry.fstype),
            options_cell,
        ]);
    }
    println!("{table}");
    eprintln!("{} mount(s)", entries.len());
    Ok(())
}

fn filter_entries(entries: Vec<MountEntry>, args: &Args) -> Vec<MountEntry> {
    entries
        .into_iter()
        .filter(|e| args.fstype.as_ref().is_none_or(|t| &e.fstype == t))
        .filter(|e| args.under.as_ref().is_none_or(|dir| e.mountpoint.starts_with(dir)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use easymount::mount_table::parse_mount_table;

    const SAMPLE: &str = "\
proc /proc proc rw,nosuid 0 0
none /mnt/a tmpfs rw 0 0
none /srv/b tmpfs ro 0 0
/dev/sda1 /mnt/data ext4 rw 0 0
";

    #[test]
    fn test_filter_by_type_and_dir() {
        let args = Args {
            fstype: Some("tmpfs".to_string()),
            under: Some(PathBuf::from("/mnt")),
            json: false,
        };
        let entries = filter_entries(parse_mount_table(SAMPLE), &args);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mountpoint, PathBuf::from("/mnt/a"));
    }

    #[test]
    fn test_no_filter_keeps_all() {
        let args = Args {
            fstype: None,
            under: None,
            json: true,
        };
        assert_eq!(filter_entries(parse_mount_table(SAMPLE), &args).len(), 4);
    }
}
