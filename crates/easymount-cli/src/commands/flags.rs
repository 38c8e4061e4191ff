//! Flags command - print the mount/unmount flag tables.

use anyhow::Result;
use clap::{Args as ClapArgs, ColorChoice};
use comfy_table::{Cell, Color};
use easymount::easy::{MOUNT_INTENTS, UNMOUNT_INTENTS};
use easymount::{MountFlags, UnmountFlags};
use serde::Serialize;

use crate::output::{create_table, format_hex, print_json};

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Show unmount flags instead of mount flags
    #[arg(long)]
    pub unmount: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// One row of the flag table.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FlagRow {
    pub name: &'static str,
    pub value: u32,
    pub intent: Option<&'static str>,
}

pub fn execute(args: &Args, color: ColorChoice) -> Result<()> {
    let rows = if args.unmount { unmount_rows() } else { mount_rows() };

    if args.json {
        return print_json(&rows);
    }

    let mut table = create_table(color);
    table.set_header(vec!["Name", "Value", "Hex", "Intent"]);
    for row in &rows {
        let intent = match row.intent {
            Some(name) => Cell::new(name).fg(Color::Green),
            None => Cell::new("-"),
        };
        table.add_row(vec![
            Cell::new(row.name),
            Cell::new(row.value),
            Cell::new(format_hex(row.value)),
            intent,
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn mount_rows() -> Vec<FlagRow> {
    MountFlags::named()
        .map(|(name, flag)| FlagRow {
            name,
            value: flag.bits(),
            intent: MOUNT_INTENTS
                .iter()
                .find(|(_, f)| *f == flag)
                .map(|(intent, _)| *intent),
        })
        .collect()
}

pub fn unmount_rows() -> Vec<FlagRow> {
    UnmountFlags::named()
        .map(|(name, flag)| FlagRow {
            name,
            value: flag.bits(),
            intent: UNMOUNT_INTENTS
                .iter()
                .find(|(_, f)| *f == flag)
                .map(|(intent, _)| *intent),
        })
        .collect()
}
