//! Pass-through wrappers around `mount(2)`, `umount(2)` and `umount2(2)`.
//!
//! Arguments go to the kernel as given. The only adjustment is that an empty
//! `data` string is sent as NULL, which is how filesystems expect "no
//! options". Errors carry the kernel's errno unchanged.

use std::path::Path;

use crate::error::MountError;
use crate::flags::{MountFlags, UnmountFlags};

/// Attach the filesystem `source` of type `fstype` at `target`.
///
/// # Errors
///
/// Returns [`MountError::Mount`] with the kernel's errno when the call fails,
/// or [`MountError::Unsupported`] on platforms without `mount(2)`.
pub fn mount(
    source: &str,
    target: impl AsRef<Path>,
    fstype: &str,
    flags: MountFlags,
    data: Option<&str>,
) -> Result<(), MountError> {
    let target = target.as_ref();
    let data = data.filter(|d| !d.is_empty());

    tracing::debug!(
        source,
        target = %target.display(),
        fstype,
        flags = %flags,
        data = data.unwrap_or(""),
        "mount"
    );

    #[cfg(target_os = "linux")]
    {
        nix::mount::mount(
            Some(source),
            target,
            Some(fstype),
            nix::mount::MsFlags::from(flags),
            data,
        )
        .map_err(|errno| kernel_error(MountKind::Mount, target, errno))
    }

    #[cfg(not(target_os = "linux"))]
    {
        Err(MountError::Unsupported)
    }
}

/// Detach the filesystem mounted at `target`.
///
/// # Errors
///
/// Returns [`MountError::Unmount`] with the kernel's errno when the call fails.
pub fn umount(target: impl AsRef<Path>) -> Result<(), MountError> {
    let target = target.as_ref();
    tracing::debug!(target = %target.display(), "umount");

    #[cfg(target_os = "linux")]
    {
        nix::mount::umount(target).map_err(|errno| kernel_error(MountKind::Unmount, target, errno))
    }

    #[cfg(not(target_os = "linux"))]
    {
        Err(MountError::Unsupported)
    }
}

/// Detach the filesystem mounted at `target`, with unmount flags.
///
/// # Errors
///
/// Returns [`MountError::Unmount`] with the kernel's errno when the call fails.
pub fn umount2(target: impl AsRef<Path>, flags: UnmountFlags) -> Result<(), MountError> {
    let target = target.as_ref();
    tracing::debug!(target = %target.display(), flags = %flags, "umount2");

    #[cfg(target_os = "linux")]
    {
        nix::mount::umount2(target, nix::mount::MntFlags::from(flags))
            .map_err(|errno| kernel_error(MountKind::Unmount, target, errno))
    }

    #[cfg(not(target_os = "linux"))]
    {
        Err(MountError::Unsupported)
    }
}

#[cfg(target_os = "linux")]
#[derive(Clone, Copy)]
enum MountKind {
    Mount,
    Unmount,
}

#[cfg(target_os = "linux")]
fn kernel_error(kind: MountKind, target: &Path, source: nix::errno::Errno) -> MountError {
    tracing::debug!(target = %target.display(), errno = %source, "system call failed");
    let target = target.to_path_buf();
    match kind {
        MountKind::Mount => MountError::Mount { target, source },
        MountKind::Unmount => MountError::Unmount { target, source },
    }
}
