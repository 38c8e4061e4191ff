//! Error type shared by every mount operation.
//!
//! Failures from the kernel are carried as the raw [`Errno`] it returned.
//! Nothing here interprets or retries them.

use std::io;
use std::path::PathBuf;

use nix::errno::Errno;
use thiserror::Error;

/// Errors returned by the mount helpers.
#[derive(Error, Debug)]
pub enum MountError {
    /// `mount(2)` returned an error.
    #[error("Mount failed for {}: {source}", target.display())]
    Mount {
        /// Target directory passed to the call.
        target: PathBuf,
        /// Errno reported by the kernel.
        #[source]
        source: Errno,
    },

    /// `umount(2)` or `umount2(2)` returned an error.
    #[error("Unmount failed for {}: {source}", target.display())]
    Unmount {
        /// Target directory passed to the call.
        target: PathBuf,
        /// Errno reported by the kernel.
        #[source]
        source: Errno,
    },

    /// A flag name did not match any known constant.
    #[error("Unknown flag name: {0}")]
    UnknownFlag(String),

    /// Filesystem I/O around a mount failed (creating or removing a directory, etc.).
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path the operation was working on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The current platform has no `mount(2)` / `umount2(2)`.
    #[error("Mount system calls are not supported on this platform")]
    Unsupported,
}

impl MountError {
    /// The errno reported by the kernel, if this error came from a system call.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            MountError::Mount { source, .. } | MountError::Unmount { source, .. } => Some(*source),
            _ => None,
        }
    }

    /// The integer OS error code, as `errno` would hold it after the failed call.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            MountError::Io { source, .. } => source.raw_os_error(),
            other => other.errno().map(|e| e as i32),
        }
    }

    /// Whether the kernel refused the call for lack of privilege.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self.errno(), Some(Errno::EPERM | Errno::EACCES))
            || matches!(self, MountError::Io { source, .. } if source.kind() == io::ErrorKind::PermissionDenied)
    }

    /// Whether the target (or source) path does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self.errno(), Some(Errno::ENOENT))
            || matches!(self, MountError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MountError::Io {
            path: path.into(),
            source,
        }
    }
}
