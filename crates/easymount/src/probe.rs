//! Live checks against the running kernel.
//!
//! A probe mounts a scratch filesystem (tmpfs by default) with one flag,
//! confirms the mount shows up in the mount table, and unmounts it again.
//! Sweeping every flag tells you which ones this kernel and privilege level
//! accept. [`probe_unmount`] does the reverse for the unmount flags: a plain
//! scratch mount taken down with `umount2(2)` and the flag under test.
//! [`smoke`] goes one step further and does real I/O on the mount.
//!
//! Everything here needs `CAP_SYS_ADMIN`; without it each probe reports the
//! kernel's `EPERM`.

use std::fs;
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use serde::Serialize;

use crate::easy::UNMOUNT_INTENTS;
use crate::error::MountError;
use crate::flags::{MountFlags, UnmountFlags};
use crate::mount_table::{self, MountEntry};
use crate::syscall;

/// File written by [`smoke`].
pub const SMOKE_FILE: &str = "hello.txt";

/// Content written by [`smoke`].
pub const SMOKE_CONTENT: &str = "Hello from mounted tmpfs!";

/// Where and what to mount when probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Parent directory for the per-flag mountpoints
    pub base_dir: PathBuf,
    /// Mount source
    pub source: String,
    /// Filesystem type
    pub fstype: String,
    /// Filesystem option string
    pub data: Option<String>,
    /// Remove the mountpoint directories afterwards
    pub cleanup: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("/mnt"),
            source: "none".to_string(),
            fstype: "tmpfs".to_string(),
            data: Some("size=5M".to_string()),
            cleanup: true,
        }
    }
}

impl ProbeOptions {
    /// Mountpoint used when probing the flag called `name`.
    pub fn mountpoint_for(&self, name: &str) -> PathBuf {
        self.base_dir
            .join(format!("mount_test_{}", name.to_ascii_lowercase()))
    }

    /// Scratch mount that a `BIND` probe for `name` binds from.
    pub fn bind_source_for(&self, name: &str) -> PathBuf {
        self.base_dir
            .join(format!("mount_test_{}_src", name.to_ascii_lowercase()))
    }

    /// Mountpoint used when probing the unmount flag called `name`.
    pub fn unmount_point_for(&self, name: &str) -> PathBuf {
        self.base_dir
            .join(format!("umount_test_{}", name.to_ascii_lowercase()))
    }
}

/// How a probe ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Mounted, visible in the mount table, unmounted.
    Success,
    /// The kernel rejected the mount.
    Failed {
        /// Raw errno
        errno: i32,
        /// Short description of the errno
        message: String,
    },
    /// Something around the mount went wrong (setup, verification, unmount).
    Error {
        /// What happened
        message: String,
    },
}

impl ProbeOutcome {
    /// Short label for tables: `SUCCESS`, `FAILED`, `ERROR`.
    pub fn label(&self) -> &'static str {
        match self {
            ProbeOutcome::Success => "SUCCESS",
            ProbeOutcome::Failed { .. } => "FAILED",
            ProbeOutcome::Error { .. } => "ERROR",
        }
    }

    /// Whether the probe succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success)
    }

    fn failed(errno: Errno) -> Self {
        ProbeOutcome::Failed {
            errno: errno as i32,
            message: errno.desc().to_string(),
        }
    }
}

/// Which system call a probe exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    /// `mount(2)` with the flag under test
    Mount,
    /// `umount2(2)` with the flag under test
    Unmount,
}

/// Result of probing one flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    /// Call the flag was passed to
    pub kind: ProbeKind,
    /// Flag name (`RDONLY`)
    pub flag_name: String,
    /// Flag bits
    pub flag_value: u32,
    /// Directory that was mounted on
    pub mountpoint: PathBuf,
    /// How it went
    pub outcome: ProbeOutcome,
}

/// Mount, verify and unmount once with `flags`.
///
/// `REMOUNT` is tried on top of a scratch mount at the same directory, and
/// `BIND` binds a freshly mounted scratch source (see
/// [`ProbeOptions::bind_source_for`]); every other flag gets a plain mount.
pub fn probe_flag(name: &str, flags: MountFlags, opts: &ProbeOptions) -> ProbeResult {
    let mountpoint = opts.mountpoint_for(name);
    tracing::info!(flag = name, value = flags.bits(), mountpoint = %mountpoint.display(), "probing mount flag");

    let result = fs::create_dir_all(&mountpoint)
        .map_err(|e| MountError::io(&mountpoint, e))
        .and_then(|()| {
            if flags.contains(MountFlags::REMOUNT) {
                probe_remount(&mountpoint, flags, opts)
            } else if flags.contains(MountFlags::BIND) {
                probe_bind(&opts.bind_source_for(name), &mountpoint, flags, opts)
            } else {
                mount_checked(&opts.source, &mountpoint, &opts.fstype, flags, opts.data.as_deref())
            }
        });

    let outcome = match result {
        Ok(()) => ProbeOutcome::Success,
        Err(MountError::Mount { source, .. }) => ProbeOutcome::failed(source),
        Err(e) => ProbeOutcome::Error {
            message: e.to_string(),
        },
    };

    if opts.cleanup {
        remove_mountpoint(&mountpoint);
    }

    tracing::info!(flag = name, result = outcome.label(), "probe finished");

    ProbeResult {
        kind: ProbeKind::Mount,
        flag_name: name.to_string(),
        flag_value: flags.bits(),
        mountpoint,
        outcome,
    }
}

/// Probe every named [`MountFlags`] constant, in bit order.
pub fn probe_all(opts: &ProbeOptions) -> Vec<ProbeResult> {
    MountFlags::named()
        .map(|(name, flag)| probe_flag(name, flag, opts))
        .collect()
}

/// Mount a scratch filesystem, then unmount it with `umount2(2)` and `flags`.
///
/// With `EXPIRE` the first call only marks the mount and returns `EAGAIN`;
/// it is repeated once. Whatever happens, nothing is left mounted: a failed
/// unmount is followed by a lazy detach.
pub fn probe_unmount(name: &str, flags: UnmountFlags, opts: &ProbeOptions) -> ProbeResult {
    let mountpoint = opts.unmount_point_for(name);
    tracing::info!(flag = name, value = flags.bits(), mountpoint = %mountpoint.display(), "probing unmount flag");

    let outcome = match run_unmount_probe(&mountpoint, flags, opts) {
        Ok(()) => ProbeOutcome::Success,
        Err(MountError::Mount { source, .. } | MountError::Unmount { source, .. }) => {
            ProbeOutcome::failed(source)
        }
        Err(e) => ProbeOutcome::Error {
            message: e.to_string(),
        },
    };

    if opts.cleanup {
        remove_mountpoint(&mountpoint);
    }

    tracing::info!(flag = name, result = outcome.label(), "probe finished");

    ProbeResult {
        kind: ProbeKind::Unmount,
        flag_name: name.to_string(),
        flag_value: flags.bits(),
        mountpoint,
        outcome,
    }
}

/// Probe every unmount intent (`force`, `detach`, `expire`).
pub fn probe_unmount_all(opts: &ProbeOptions) -> Vec<ProbeResult> {
    UNMOUNT_INTENTS
        .iter()
        .map(|(_, flag)| probe_unmount(&flag.to_string(), *flag, opts))
        .collect()
}

/// Mount, check the mount table, unmount.
fn mount_checked(
    source: &str,
    mountpoint: &Path,
    fstype: &str,
    flags: MountFlags,
    data: Option<&str>,
) -> Result<(), MountError> {
    syscall::mount(source, mountpoint, fstype, flags, data)?;
    let visible = require_visible(mountpoint);
    let unmounted = syscall::umount(mountpoint);
    visible?;
    unmounted
}

fn probe_remount(mountpoint: &Path, flags: MountFlags, opts: &ProbeOptions) -> Result<(), MountError> {
    let data = opts.data.as_deref();
    syscall::mount(&opts.source, mountpoint, &opts.fstype, MountFlags::empty(), data)?;

    let remounted = syscall::mount(&opts.source, mountpoint, &opts.fstype, flags, data)
        .and_then(|()| require_visible(mountpoint));
    let unmounted = syscall::umount(mountpoint);
    remounted?;
    unmounted
}

fn probe_bind(
    bind_src: &Path,
    mountpoint: &Path,
    flags: MountFlags,
    opts: &ProbeOptions,
) -> Result<(), MountError> {
    fs::create_dir_all(bind_src).map_err(|e| MountError::io(bind_src, e))?;

    let result = syscall::mount(
        &opts.source,
        bind_src,
        &opts.fstype,
        MountFlags::empty(),
        opts.data.as_deref(),
    )
    .and_then(|()| {
        let bound = bind_and_read(bind_src, mountpoint, flags);
        let unmounted = syscall::umount(bind_src);
        bound?;
        unmounted
    });

    if opts.cleanup {
        remove_mountpoint(bind_src);
    }
    result
}

fn bind_and_read(bind_src: &Path, mountpoint: &Path, flags: MountFlags) -> Result<(), MountError> {
    let marker = bind_src.join(SMOKE_FILE);
    fs::write(&marker, SMOKE_CONTENT).map_err(|e| MountError::io(&marker, e))?;

    syscall::mount(&bind_src.to_string_lossy(), mountpoint, "", flags, None)?;

    let seen = require_visible(mountpoint).and_then(|()| {
        let through = mountpoint.join(SMOKE_FILE);
        let content = fs::read_to_string(&through).map_err(|e| MountError::io(&through, e))?;
        if content == SMOKE_CONTENT {
            Ok(())
        } else {
            Err(MountError::io(
                &through,
                std::io::Error::new(std::io::ErrorKind::InvalidData, "bind target shows other content"),
            ))
        }
    });
    let unmounted = syscall::umount(mountpoint);
    seen?;
    unmounted
}

fn run_unmount_probe(
    mountpoint: &Path,
    flags: UnmountFlags,
    opts: &ProbeOptions,
) -> Result<(), MountError> {
    fs::create_dir_all(mountpoint).map_err(|e| MountError::io(mountpoint, e))?;
    syscall::mount(
        &opts.source,
        mountpoint,
        &opts.fstype,
        MountFlags::empty(),
        opts.data.as_deref(),
    )?;

    let mut result = syscall::umount2(mountpoint, flags);
    if flags.contains(UnmountFlags::EXPIRE)
        && result.as_ref().err().and_then(MountError::errno) == Some(Errno::EAGAIN)
    {
        result = syscall::umount2(mountpoint, flags);
    }

    if let Err(e) = result {
        if let Err(detach) = syscall::umount2(mountpoint, UnmountFlags::DETACH) {
            tracing::warn!(mountpoint = %mountpoint.display(), error = %detach, "detach after failed unmount");
        }
        return Err(e);
    }

    if lookup_entry(mountpoint)?.is_some() {
        return Err(MountError::io(
            mountpoint,
            std::io::Error::other("unmount succeeded but the mount is still listed"),
        ));
    }
    Ok(())
}

fn require_visible(mountpoint: &Path) -> Result<(), MountError> {
    if lookup_entry(mountpoint)?.is_some() {
        return Ok(());
    }
    Err(MountError::io(
        mountpoint,
        std::io::Error::other("mount succeeded but is not in the mount table"),
    ))
}

/// What [`smoke`] observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmokeReport {
    /// Directory that was mounted on
    pub mountpoint: PathBuf,
    /// Mount table entry seen while mounted
    pub entry: Option<MountEntry>,
    /// File written inside the mount
    pub file: PathBuf,
    /// Content read back from it
    pub content: String,
}

/// Mount a scratch filesystem with `NOSUID` at `dir`, write a file, read it
/// back, and unmount.
///
/// The unmount and directory cleanup run even when the I/O in between fails.
///
/// # Errors
///
/// The first failure among mount, I/O, verification and unmount.
pub fn smoke(dir: &Path, opts: &ProbeOptions) -> Result<SmokeReport, MountError> {
    tracing::info!(mountpoint = %dir.display(), fstype = %opts.fstype, "smoke test");
    fs::create_dir_all(dir).map_err(|e| MountError::io(dir, e))?;

    let result = syscall::mount(
        &opts.source,
        dir,
        &opts.fstype,
        MountFlags::NOSUID,
        opts.data.as_deref(),
    )
    .and_then(|()| {
        let exercised = exercise(dir);
        let unmounted = syscall::umount(dir);
        let report = exercised?;
        unmounted?;
        Ok(report)
    });

    if opts.cleanup {
        remove_mountpoint(dir);
    }

    result
}

fn exercise(dir: &Path) -> Result<SmokeReport, MountError> {
    let entry = lookup_entry(dir)?;
    let file = dir.join(SMOKE_FILE);

    fs::write(&file, SMOKE_CONTENT).map_err(|e| MountError::io(&file, e))?;
    let content = fs::read_to_string(&file).map_err(|e| MountError::io(&file, e))?;
    tracing::debug!(file = %file.display(), content = %content, "read back");

    if content != SMOKE_CONTENT {
        return Err(MountError::io(
            &file,
            std::io::Error::new(std::io::ErrorKind::InvalidData, "content mismatch"),
        ));
    }

    Ok(SmokeReport {
        mountpoint: dir.to_path_buf(),
        entry,
        file,
        content,
    })
}

fn lookup_entry(mountpoint: &Path) -> Result<Option<MountEntry>, MountError> {
    let path = mountpoint
        .canonicalize()
        .unwrap_or_else(|_| mountpoint.to_path_buf());
    let entries = mount_table::read_mount_table()?;
    Ok(mount_table::find_mount(&entries, &path).cloned())
}

fn remove_mountpoint(dir: &Path) {
    if !dir.exists() {
        return;
    }
    if let Err(e) = fs::remove_dir(dir) {
        tracing::warn!(mountpoint = %dir.display(), error = %e, "cleanup failed");
    }
}
