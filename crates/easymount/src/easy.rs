//! One-flag convenience calls, named by intent.
//!
//! Each helper in [`mount`] sets exactly one [`MountFlags`] bit and each helper
//! in [`umount`] exactly one [`UnmountFlags`] bit; the rest of the arguments go
//! to the kernel untouched.
//!
//! ```no_run
//! use easymount::easy;
//!
//! easy::mount::read_only("/dev/sdb1", "/mnt/usb", "ext4", None)?;
//! easy::umount::detach("/mnt/usb")?;
//! # Ok::<(), easymount::MountError>(())
//! ```
//!
//! The same mapping is available as data in [`MOUNT_INTENTS`] and
//! [`UNMOUNT_INTENTS`], keyed by kebab-case names (`read-only`, `detach`).

use crate::flags::{MountFlags, UnmountFlags};

macro_rules! mount_intents {
    ($($(#[$doc:meta])* $func:ident => $name:literal, $flag:ident;)+) => {
        /// Intent name and flag for every helper in [`mount`], in bit order.
        pub const MOUNT_INTENTS: &[(&str, MountFlags)] = &[$(($name, MountFlags::$flag)),+];

        /// Mount helpers, one flag each.
        pub mod mount {
            use std::path::Path;

            use crate::error::MountError;
            use crate::flags::MountFlags;
            use crate::syscall;

            $(
                $(#[$doc])*
                ///
                /// # Errors
                ///
                /// Whatever `mount(2)` reports, see [`syscall::mount`].
                pub fn $func(
                    source: &str,
                    target: impl AsRef<Path>,
                    fstype: &str,
                    data: Option<&str>,
                ) -> Result<(), MountError> {
                    syscall::mount(source, target, fstype, MountFlags::$flag, data)
                }
            )+
        }
    };
}

macro_rules! unmount_intents {
    ($($(#[$doc:meta])* $func:ident => $name:literal, $flag:ident;)+) => {
        /// Intent name and flag for every helper in [`umount`].
        pub const UNMOUNT_INTENTS: &[(&str, UnmountFlags)] = &[$(($name, UnmountFlags::$flag)),+];

        /// Unmount helpers, one flag each.
        pub mod umount {
            use std::path::Path;

            use crate::error::MountError;
            use crate::flags::UnmountFlags;
            use crate::syscall;

            $(
                $(#[$doc])*
                ///
                /// # Errors
                ///
                /// Whatever `umount2(2)` reports, see [`syscall::umount2`].
                pub fn $func(target: impl AsRef<Path>) -> Result<(), MountError> {
                    syscall::umount2(target, UnmountFlags::$flag)
                }
            )+
        }
    };
}

mount_intents! {
    /// Mount read-only (`RDONLY`).
    read_only => "read-only", RDONLY;
    /// Ignore set-user-ID and set-group-ID bits (`NOSUID`).
    no_set_uid => "no-set-uid", NOSUID;
    /// Disallow device special files (`NODEV`).
    no_device => "no-device", NODEV;
    /// Disallow program execution (`NOEXEC`).
    no_execute => "no-execute", NOEXEC;
    /// Synchronous writes (`SYNCHRONOUS`).
    sync => "sync", SYNCHRONOUS;
    /// Change flags of an existing mount (`REMOUNT`).
    remount => "remount", REMOUNT;
    /// Allow mandatory locks (`MANDLOCK`).
    mand_lock => "mand-lock", MANDLOCK;
    /// Synchronous directory updates (`DIRSYNC`).
    dir_sync => "dir-sync", DIRSYNC;
    /// Skip access time updates (`NOATIME`).
    no_atime => "no-atime", NOATIME;
    /// Skip directory access time updates (`NODIRATIME`).
    no_dir_atime => "no-dir-atime", NODIRATIME;
    /// Bind mount `source` at `target` (`BIND`).
    bind => "bind", BIND;
    /// Move the mount at `source` to `target` (`MOVE`).
    move_mount => "move", MOVE;
    /// Recursive (`REC`).
    recursive => "recursive", REC;
    /// Suppress kernel warnings (`SILENT`).
    silent => "silent", SILENT;
    /// POSIX ACL semantics (`POSIXACL`).
    posix_acl => "posix-acl", POSIXACL;
    /// Unbindable propagation (`UNBINDABLE`).
    unbindable => "unbindable", UNBINDABLE;
    /// Private propagation (`PRIVATE`).
    private => "private", PRIVATE;
    /// Slave propagation (`SLAVE`).
    slave => "slave", SLAVE;
    /// Shared propagation (`SHARED`).
    shared => "shared", SHARED;
    /// Relative access times (`RELATIME`).
    rel_atime => "rel-atime", RELATIME;
    /// Kernel-internal mount (`KERNMOUNT`).
    kern_mount => "kern-mount", KERNMOUNT;
    /// Maintain inode version (`I_VERSION`).
    i_version => "i-version", I_VERSION;
    /// Strict access times (`STRICTATIME`).
    strict_atime => "strict-atime", STRICTATIME;
    /// Lazy timestamp writeback (`LAZYTIME`).
    lazy_time => "lazy-time", LAZYTIME;
}

unmount_intents! {
    /// Unmount even when busy (`FORCE`).
    force => "force", FORCE;
    /// Lazy detach (`DETACH`).
    detach => "detach", DETACH;
    /// Mark for expiry; a second call unmounts if unused (`EXPIRE`).
    expire => "expire", EXPIRE;
}

/// Look up a mount intent by name (`read-only`, `no_atime`, `Bind`, ...).
pub fn mount_intent(name: &str) -> Option<MountFlags> {
    let key = normalize(name);
    MOUNT_INTENTS
        .iter()
        .find(|(intent, _)| *intent == key)
        .map(|(_, flag)| *flag)
}

/// Look up an unmount intent by name.
pub fn unmount_intent(name: &str) -> Option<UnmountFlags> {
    let key = normalize(name);
    UNMOUNT_INTENTS
        .iter()
        .find(|(intent, _)| *intent == key)
        .map(|(_, flag)| *flag)
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_lowercase().replace('_', "-")
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_every_mount_flag_has_one_intent() {
        assert_eq!(MOUNT_INTENTS.len(), MountFlags::named().count());
        let flags: HashSet<_> = MOUNT_INTENTS.iter().map(|(_, f)| *f).collect();
        assert_eq!(flags.len(), MOUNT_INTENTS.len());
        for (name, flag) in MOUNT_INTENTS {
            assert_eq!(flag.bits().count_ones(), 1, "{name}");
        }
    }

    #[test]
    fn test_intents_follow_bit_order() {
        let from_table: Vec<_> = MOUNT_INTENTS.iter().map(|(_, f)| *f).collect();
        let from_flags: Vec<_> = MountFlags::named().map(|(_, f)| f).collect();
        assert_eq!(from_table, from_flags);
    }

    #[test]
    fn test_intent_names_unique() {
        let names: HashSet<_> = MOUNT_INTENTS.iter().map(|(n, _)| *n).collect();
        assert_eq!(names.len(), MOUNT_INTENTS.len());
    }

    #[test]
    fn test_unmount_intents() {
        assert_eq!(
            UNMOUNT_INTENTS,
            &[
                ("force", UnmountFlags::FORCE),
                ("detach", UnmountFlags::DETACH),
                ("expire", UnmountFlags::EXPIRE),
            ]
        );
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(mount_intent("read-only"), Some(MountFlags::RDONLY));
        assert_eq!(mount_intent("no_atime"), Some(MountFlags::NOATIME));
        assert_eq!(mount_intent(" Move "), Some(MountFlags::MOVE));
        assert_eq!(mount_intent("i-version"), Some(MountFlags::I_VERSION));
        assert_eq!(mount_intent("detach"), None);
        assert_eq!(unmount_intent("DETACH"), Some(UnmountFlags::DETACH));
        assert_eq!(unmount_intent("read-only"), None);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_helpers_forward_errors() {
        let missing = "/nonexistent/easymount/easy/target";
        let err = mount::read_only("none", missing, "tmpfs", None).unwrap_err();
        assert!(matches!(err, crate::MountError::Mount { .. }));
        let err = umount::detach(missing).unwrap_err();
        assert!(matches!(err, crate::MountError::Unmount { .. }));
    }
}
