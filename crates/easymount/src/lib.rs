//! Named flags and thin wrappers for Linux `mount(2)` / `umount2(2)`.
//!
//! # Components
//!
//! - [`MountFlags`] / [`UnmountFlags`] - flag bits, equal to the kernel's values
//! - [`mount`], [`umount`], [`umount2`] - pass-through system calls
//! - [`easy`] - one-flag helpers named by intent (`easy::mount::read_only`)
//! - [`MountRequest`] - a mount call as a value
//! - [`mount_table`] - parsed `/proc/self/mounts`, for checking results
//! - [`probe`] - mount/unmount a scratch filesystem to see which mount and
//!   unmount flags work
//!
//! Nothing here retries, validates or interprets: arguments reach the kernel
//! as given and its errno comes back in [`MountError`].
//!
//! # Example
//!
//! ```no_run
//! use easymount::{mount, umount2, MountFlags, UnmountFlags};
//!
//! mount(
//!     "none",
//!     "/mnt/scratch",
//!     "tmpfs",
//!     MountFlags::NOSUID | MountFlags::NODEV,
//!     Some("size=5M"),
//! )?;
//! umount2("/mnt/scratch", UnmountFlags::DETACH)?;
//! # Ok::<(), easymount::MountError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod easy;
mod error;
mod flags;
pub mod mount_table;
pub mod probe;
mod request;
mod syscall;

pub use error::MountError;
pub use flags::{MountFlags, UnmountFlags};
pub use mount_table::{find_mount, is_mounted, read_mount_table, MountEntry};
pub use probe::{
    probe_all, probe_flag, probe_unmount, probe_unmount_all, smoke, ProbeKind, ProbeOptions,
    ProbeOutcome, ProbeResult, SmokeReport,
};
pub use request::MountRequest;
pub use syscall::{mount, umount, umount2};
