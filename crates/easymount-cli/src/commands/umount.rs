//! Umount command - detach a mounted filesystem.
//!
//! Without flags this is a plain `umount(2)`; any flag, intent or shortcut
//! switches to `umount2(2)`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use easymount::{easy, umount, umount2, MountError, UnmountFlags};
use tracing::instrument;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Directory where the filesystem is mounted
    pub target: PathBuf,

    /// Unmount flags by name, comma separated (e.g. DETACH,NOFOLLOW)
    #[arg(long, value_name = "FLAGS")]
    pub flags: Option<UnmountFlags>,

    /// Add one flag by intent name (force, detach, expire); repeatable
    #[arg(short, long = "intent", value_name = "NAME")]
    pub intents: Vec<String>,

    /// Force unmount even if the filesystem is busy
    #[arg(short, long)]
    pub force: bool,

    /// Lazy unmount: detach now, clean up once no longer busy
    #[arg(short, long)]
    pub lazy: bool,
}

#[instrument(level = "info", name = "cmd::umount", skip_all, fields(target = %args.target.display()))]
pub fn execute(args: &Args, quiet: bool) -> Result<()> {
    let flags = resolve_flags(args)?;

    let result = if flags.is_empty() {
        umount(&args.target)
    } else {
        umount2(&args.target, flags)
    };
    result.with_context(|| format!("Failed to unmount {}", args.target.display()))?;

    if quiet {
        return Ok(());
    }
    if flags.is_empty() {
        eprintln!("Unmounted {}", args.target.display());
    } else {
        eprintln!("Unmounted {} ({flags})", args.target.display());
    }
    Ok(())
}

/// Merge `--flags`, `--intent`, `--force` and `--lazy` into one set.
pub fn resolve_flags(args: &Args) -> Result<UnmountFlags, MountError> {
    let mut flags = args.flags.unwrap_or_default();
    for name in &args.intents {
        flags |= easy::unmount_intent(name).ok_or_else(|| MountError::UnknownFlag(name.clone()))?;
    }
    if args.force {
        flags |= UnmountFlags::FORCE;
    }
    if args.lazy {
        flags |= UnmountFlags::DETACH;
    }
    Ok(flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> Args {
        Args {
            target: PathBuf::from("/mnt/x"),
            flags: None,
            intents: Vec::new(),
            force: false,
            lazy: false,
        }
    }

    #[test]
    fn test_no_flags_means_plain_umount() {
        assert!(resolve_flags(&args()).unwrap().is_empty());
    }

    #[test]
    fn test_shortcuts_and_intents() {
        let mut a = args();
        a.force = true;
        a.lazy = true;
        a.intents = vec!["expire".to_string()];
        a.flags = Some(UnmountFlags::NOFOLLOW);
        assert_eq!(resolve_flags(&a).unwrap(), UnmountFlags::all() - UnmountFlags::UNUSED);
    }

    #[test]
    fn test_unknown_intent() {
        let mut a = args();
        a.intents = vec!["read-only".to_string()];
        assert!(matches!(resolve_flags(&a), Err(MountError::UnknownFlag(_))));
    }
}
