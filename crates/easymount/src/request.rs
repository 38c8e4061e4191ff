//! A single mount invocation as a value.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::MountError;
use crate::flags::MountFlags;
use crate::syscall;

/// Arguments for one `mount(2)` call.
///
/// ```
/// use easymount::{MountFlags, MountRequest};
///
/// let request = MountRequest::new("/mnt/scratch")
///     .fstype("tmpfs")
///     .flags(MountFlags::NOSUID | MountFlags::NODEV)
///     .data("size=5M");
///
/// assert_eq!(request.source_name(), "none");
/// assert_eq!(request.data_str(), Some("size=5M"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountRequest {
    source: String,
    target: PathBuf,
    fstype: String,
    flags: MountFlags,
    data: Option<String>,
}

impl MountRequest {
    /// Start a request for `target` with source `none`, no type, no flags.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            source: "none".to_string(),
            target: target.into(),
            fstype: String::new(),
            flags: MountFlags::empty(),
            data: None,
        }
    }

    /// Set the source (device, directory, or a placeholder such as `none`).
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the filesystem type.
    #[must_use]
    pub fn fstype(mut self, fstype: impl Into<String>) -> Self {
        self.fstype = fstype.into();
        self
    }

    /// Replace the flag set.
    #[must_use]
    pub fn flags(mut self, flags: MountFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Add flags to the current set.
    #[must_use]
    pub fn with_flag(mut self, flag: MountFlags) -> Self {
        self.flags |= flag;
        self
    }

    /// Set the filesystem-specific option string. Empty means none.
    #[must_use]
    pub fn data(mut self, data: impl Into<String>) -> Self {
        let data = data.into();
        self.data = (!data.is_empty()).then_some(data);
        self
    }

    /// Source passed to the kernel.
    pub fn source_name(&self) -> &str {
        &self.source
    }

    /// Target directory.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Filesystem type.
    pub fn fstype_name(&self) -> &str {
        &self.fstype
    }

    /// Flags for the call.
    pub fn mount_flags(&self) -> MountFlags {
        self.flags
    }

    /// Option string, if any.
    pub fn data_str(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Issue the `mount(2)` call.
    ///
    /// # Errors
    ///
    /// Whatever [`syscall::mount`] returns.
    pub fn perform(&self) -> Result<(), MountError> {
        syscall::mount(
            &self.source,
            &self.target,
            &self.fstype,
            self.flags,
            self.data.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = MountRequest::new("/mnt/x");
        assert_eq!(req.source_name(), "none");
        assert_eq!(req.target(), Path::new("/mnt/x"));
        assert_eq!(req.fstype_name(), "");
        assert!(req.mount_flags().is_empty());
        assert_eq!(req.data_str(), None);
    }

    #[test]
    fn test_builder() {
        let req = MountRequest::new("/mnt/x")
            .source("/srv/data")
            .fstype("ext4")
            .flags(MountFlags::RDONLY)
            .with_flag(MountFlags::NOATIME)
            .data("errors=remount-ro");
        assert_eq!(req.source_name(), "/srv/data");
        assert_eq!(req.fstype_name(), "ext4");
        assert_eq!(req.mount_flags(), MountFlags::RDONLY | MountFlags::NOATIME);
        assert_eq!(req.data_str(), Some("errors=remount-ro"));
    }

    #[test]
    fn test_empty_data_is_none() {
        let req = MountRequest::new("/mnt/x").data("size=1M").data("");
        assert_eq!(req.data_str(), None);
    }

    #[test]
    fn test_serializes_to_json() {
        let req = MountRequest::new("/mnt/x")
            .fstype("tmpfs")
            .flags(MountFlags::NOSUID | MountFlags::NODEV);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["target"], "/mnt/x");
        assert_eq!(value["fstype"], "tmpfs");
        assert_eq!(value["flags"], "NOSUID | NODEV");
        assert!(value["data"].is_null());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_perform_reports_target() {
        let target = "/nonexistent/easymount/request/target";
        let err = MountRequest::new(target).fstype("tmpfs").perform().unwrap_err();
        assert!(matches!(err, MountError::Mount { target: ref t, .. } if t == Path::new(target)));
    }
}
