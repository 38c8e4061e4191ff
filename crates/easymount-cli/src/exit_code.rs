//! Exit codes for the CLI.
//!
//! These follow common Unix conventions and give scripts something
//! better than "non-zero" to branch on.

/// Successful execution
pub const SUCCESS: u8 = 0;

/// General/unspecified error
pub const GENERAL_ERROR: u8 = 1;

/// Command-line usage error (bad arguments, unknown flag or intent)
pub const USAGE_ERROR: u8 = 2;

/// The kernel refused for lack of privilege (EPERM, EACCES)
pub const PERMISSION_DENIED: u8 = 5;

/// Mount or unmount system call failed for any other reason
pub const MOUNT_FAILED: u8 = 6;

/// Source or target path not found
pub const NOT_FOUND: u8 = 7;
