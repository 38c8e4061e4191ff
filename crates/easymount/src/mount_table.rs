//! Read-only view of the kernel mount table.
//!
//! Used to confirm what a mount call actually did. On Linux this parses
//! `/proc/self/mounts`:
//!
//! `{source} {mountpoint} {fstype} {options} {dump} {pass}`
//!
//! e.g. `none /mnt/mount_test_rdonly tmpfs ro,relatime,size=5120k 0 0`

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::MountError;

/// Location of the calling process's mount table.
pub const MOUNT_TABLE_PATH: &str = "/proc/self/mounts";

/// One line of the mount table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MountEntry {
    /// Device or placeholder (`none`, `tmpfs`, `/dev/sda1`)
    pub source: String,
    /// Where it is attached
    pub mountpoint: PathBuf,
    /// Filesystem type (`tmpfs`, `ext4`, `fuse.sshfs`)
    pub fstype: String,
    /// Comma-separated options split into a list
    pub options: Vec<String>,
}

impl MountEntry {
    /// Whether `name` appears in the option list (`ro`, `nosuid`, `size=5120k`).
    ///
    /// A bare name also matches a `name=value` option.
    pub fn has_option(&self, name: &str) -> bool {
        self.options.iter().any(|opt| {
            opt == name
                || opt
                    .split_once('=')
                    .is_some_and(|(key, _)| key == name)
        })
    }

    /// Whether the mount is read-only.
    pub fn is_read_only(&self) -> bool {
        self.has_option("ro")
    }
}

/// Parse a single mount table line.
///
/// Returns `None` for lines with fewer than four fields.
pub fn parse_mount_line(line: &str) -> Option<MountEntry> {
    let mut parts = line.split_whitespace();
    let source = unescape_mount_field(parts.next()?);
    let mountpoint = PathBuf::from(unescape_mount_field(parts.next()?));
    let fstype = parts.next()?.to_string();
    let options = parts
        .next()?
        .split(',')
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    Some(MountEntry {
        source,
        mountpoint,
        fstype,
        options,
    })
}

/// Parse a whole mount table, skipping malformed lines.
pub fn parse_mount_table(contents: &str) -> Vec<MountEntry> {
    contents.lines().filter_map(parse_mount_line).collect()
}

/// Read the current process's mount table.
///
/// # Errors
///
/// Returns [`MountError::Io`] if the table cannot be read, or
/// [`MountError::Unsupported`] off Linux.
pub fn read_mount_table() -> Result<Vec<MountEntry>, MountError> {
    #[cfg(target_os = "linux")]
    {
        let contents = std::fs::read_to_string(MOUNT_TABLE_PATH)
            .map_err(|e| MountError::io(MOUNT_TABLE_PATH, e))?;
        Ok(parse_mount_table(&contents))
    }

    #[cfg(not(target_os = "linux"))]
    {
        Err(MountError::Unsupported)
    }
}

/// The topmost mount at exactly `path`, if any.
///
/// Later lines shadow earlier ones, matching how stacked mounts resolve.
pub fn find_mount<'a>(entries: &'a [MountEntry], path: &Path) -> Option<&'a MountEntry> {
    entries.iter().rev().find(|e| e.mountpoint == path)
}

/// Whether something is mounted at exactly `path` right now.
///
/// # Errors
///
/// Propagates [`read_mount_table`] errors.
pub fn is_mounted(path: &Path) -> Result<bool, MountError> {
    let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let entries = read_mount_table()?;
    Ok(find_mount(&entries, &path).is_some())
}

/// Decode the octal escapes the kernel uses for whitespace and backslashes.
///
/// - `\040` = space
/// - `\011` = tab
/// - `\012` = newline
/// - `\134` = backslash
fn unescape_mount_field(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\'
            && let Some(code) = bytes
                .get(i + 1..i + 4)
                .and_then(|d| std::str::from_utf8(d).ok())
                .filter(|d| d.bytes().all(|b| (b'0'..=b'7').contains(&b)))
                .and_then(|d| u8::from_str_radix(d, 8).ok())
        {
            out.push(code);
            i += 4;
            continue;
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
/dev/sda1 / ext4 rw,relatime,errors=remount-ro 0 0
none /mnt/mount_test_rdonly tmpfs ro,relatime,size=5120k 0 0
garbage
tmpfs /mnt/my\\040dir tmpfs rw,nosuid,size=5120k 0 0
none /mnt/mount_test_rdonly tmpfs rw,relatime 0 0
";

    #[test]
    fn test_parse_mount_line() {
        let entry = parse_mount_line("none /mnt/quick_test tmpfs rw,nosuid,size=5120k 0 0").unwrap();
        assert_eq!(entry.source, "none");
        assert_eq!(entry.mountpoint, PathBuf::from("/mnt/quick_test"));
        assert_eq!(entry.fstype, "tmpfs");
        assert_eq!(entry.options, ["rw", "nosuid", "size=5120k"]);
        assert!(entry.has_option("nosuid"));
        assert!(entry.has_option("size"));
        assert!(!entry.has_option("ro"));
        assert!(!entry.is_read_only());
    }

    #[test]
    fn test_parse_short_line() {
        assert!(parse_mount_line("garbage").is_none());
        assert!(parse_mount_line("a b c").is_none());
        assert!(parse_mount_line("").is_none());
    }

    #[test]
    fn test_parse_table_skips_garbage() {
        let entries = parse_mount_table(SAMPLE);
        assert_eq!(entries.len(), 6);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape_mount_field("/mnt/my\\040disk"), "/mnt/my disk");
        assert_eq!(unescape_mount_field("/mnt/a\\040b\\011c"), "/mnt/a b\tc");
        assert_eq!(unescape_mount_field("/mnt/back\\134slash"), "/mnt/back\\slash");
        assert_eq!(unescape_mount_field("/mnt/plain"), "/mnt/plain");
        // Not a full escape: kept as-is
        assert_eq!(unescape_mount_field("/mnt/x\\04"), "/mnt/x\\04");
        assert_eq!(unescape_mount_field("/mnt/x\\9zz"), "/mnt/x\\9zz");
    }

    #[test]
    fn test_escaped_mountpoint() {
        let entries = parse_mount_table(SAMPLE);
        let found = find_mount(&entries, Path::new("/mnt/my dir")).unwrap();
        assert_eq!(found.source, "tmpfs");
    }

    #[test]
    fn test_find_mount_prefers_topmost() {
        let entries = parse_mount_table(SAMPLE);
        let found = find_mount(&entries, Path::new("/mnt/mount_test_rdonly")).unwrap();
        assert!(!found.is_read_only());
        assert!(find_mount(&entries, Path::new("/mnt")).is_none());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_read_mount_table_has_root() {
        let entries = read_mount_table().unwrap();
        assert!(find_mount(&entries, Path::new("/")).is_some());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_tempdir_is_not_mountpoint() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_mounted(dir.path()).unwrap());
    }
}
