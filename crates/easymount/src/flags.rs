//! Named flag bits for `mount(2)` and `umount2(2)`.
//!
//! Values mirror `<sys/mount.h>` on Linux. Flag sets can also be built from
//! text, which is what the CLI uses:
//!
//! ```
//! use easymount::{MountFlags, UnmountFlags};
//!
//! let flags = MountFlags::parse_list("rdonly,MS_NOSUID | noexec").unwrap();
//! assert_eq!(flags, MountFlags::RDONLY | MountFlags::NOSUID | MountFlags::NOEXEC);
//! assert_eq!(flags.to_string(), "RDONLY | NOSUID | NOEXEC");
//!
//! let lazy: UnmountFlags = "MNT_DETACH".parse().unwrap();
//! assert_eq!(lazy, UnmountFlags::DETACH);
//! ```

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::MountError;

bitflags! {
    /// Flags accepted by `mount(2)`.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MountFlags: u32 {
        /// Mount read-only.
        const RDONLY = 1 << 0;
        /// Ignore set-user-ID and set-group-ID bits.
        const NOSUID = 1 << 1;
        /// Disallow access to device special files.
        const NODEV = 1 << 2;
        /// Disallow program execution.
        const NOEXEC = 1 << 3;
        /// Writes are synced at once.
        const SYNCHRONOUS = 1 << 4;
        /// Alter flags of an existing mount.
        const REMOUNT = 1 << 5;
        /// Allow mandatory locks.
        const MANDLOCK = 1 << 6;
        /// Directory modifications are synchronous.
        const DIRSYNC = 1 << 7;
        /// Do not update access times.
        const NOATIME = 1 << 10;
        /// Do not update directory access times.
        const NODIRATIME = 1 << 11;
        /// Bind mount.
        const BIND = 1 << 12;
        /// Move an existing mount.
        const MOVE = 1 << 13;
        /// Apply recursively (with BIND or a propagation flag).
        const REC = 1 << 14;
        /// Suppress some kernel warnings.
        const SILENT = 1 << 15;
        /// VFS does not apply the umask.
        const POSIXACL = 1 << 16;
        /// Change to unbindable propagation.
        const UNBINDABLE = 1 << 17;
        /// Change to private propagation.
        const PRIVATE = 1 << 18;
        /// Change to slave propagation.
        const SLAVE = 1 << 19;
        /// Change to shared propagation.
        const SHARED = 1 << 20;
        /// Update atime relative to mtime/ctime.
        const RELATIME = 1 << 21;
        /// Kernel-internal mount.
        const KERNMOUNT = 1 << 22;
        /// Update inode I_version field.
        const I_VERSION = 1 << 23;
        /// Always perform atime updates.
        const STRICTATIME = 1 << 24;
        /// Update the on-disk [acm]times lazily.
        const LAZYTIME = 1 << 25;
    }
}

bitflags! {
    /// Flags accepted by `umount2(2)`.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct UnmountFlags: u32 {
        /// Force unmount even if busy.
        const FORCE = 1 << 0;
        /// Lazy unmount: detach now, clean up when no longer busy.
        const DETACH = 1 << 1;
        /// Mark for expiry.
        const EXPIRE = 1 << 2;
        /// Do not dereference the target if it is a symlink.
        const NOFOLLOW = 1 << 3;
        /// Kernel sentinel (`UMOUNT_UNUSED`); always rejected.
        const UNUSED = 1 << 31;
    }
}

macro_rules! impl_flag_text {
    ($ty:ident, [$($prefix:literal),+]) => {
        impl $ty {
            /// Parse a list of flag names separated by `,` or `|`.
            ///
            /// Names are case-insensitive and may carry the C prefix.
            /// Blank entries are skipped, so `""` is the empty set.
            pub fn parse_list(input: &str) -> Result<Self, MountError> {
                let mut flags = Self::empty();
                for raw in input.split([',', '|']) {
                    let name = raw.trim();
                    if name.is_empty() {
                        continue;
                    }
                    let upper = name.to_ascii_uppercase();
                    let bare = [$($prefix),+]
                        .iter()
                        .find_map(|p| upper.strip_prefix(p))
                        .unwrap_or(upper.as_str());
                    let flag = Self::from_name(bare)
                        .ok_or_else(|| MountError::UnknownFlag(name.to_string()))?;
                    flags |= flag;
                }
                Ok(flags)
            }

            /// Names of the flags in this set, in bit order.
            pub fn names(&self) -> Vec<&'static str> {
                self.iter_names().map(|(name, _)| name).collect()
            }

            /// Every named flag with its name, in bit order.
            pub fn named() -> impl Iterator<Item = (&'static str, Self)> {
                Self::all().iter_names()
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let names = self.names();
                let unknown = self.bits() & !Self::all().bits();
                if names.is_empty() && unknown == 0 {
                    return f.write_str("(none)");
                }
                f.write_str(&names.join(" | "))?;
                if unknown != 0 {
                    if !names.is_empty() {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{unknown:#x}")?;
                }
                Ok(())
            }
        }

        impl FromStr for $ty {
            type Err = MountError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse_list(s)
            }
        }
    };
}

impl_flag_text!(MountFlags, ["MS_"]);
impl_flag_text!(UnmountFlags, ["UMOUNT_", "MNT_"]);

#[cfg(target_os = "linux")]
impl From<MountFlags> for nix::mount::MsFlags {
    fn from(flags: MountFlags) -> Self {
        nix::mount::MsFlags::from_bits_retain(libc::c_ulong::from(flags.bits()))
    }
}

#[cfg(target_os = "linux")]
impl From<UnmountFlags> for nix::mount::MntFlags {
    #[allow(clippy::cast_possible_wrap)]
    fn from(flags: UnmountFlags) -> Self {
        // UNUSED occupies the sign bit of the kernel's int.
        nix::mount::MntFlags::from_bits_retain(flags.bits() as libc::c_int)
    }
}
