pub mod completions;
pub mod flags;
pub mod mount;
pub mod mounts;
pub mod probe;
pub mod smoke;
pub mod umount;
