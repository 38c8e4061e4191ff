//! Configuration file support for the easymount CLI.
//!
//! Configuration is read from `$EASYMOUNT_CONFIG_DIR/config.toml` when that
//! variable is set, otherwise from `~/.config/easymount/config.toml` (XDG) or
//! `~/Library/Application Support/com.easymount.easymount/config.toml` on macOS.
//! A missing file is the same as an empty one.
//!
//! # Example configuration
//!
//! ```toml
//! [defaults]
//! fstype = "tmpfs"
//! data = "size=16M"
//! probe_dir = "/var/tmp/easymount"
//! verbosity = 1
//! ```
//!
//! Command-line arguments always win over these defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configuration directory
pub const CONFIG_DIR_ENV: &str = "EASYMOUNT_CONFIG_DIR";

/// Main configuration structure
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Default settings applied to all commands
    #[serde(default)]
    pub defaults: Defaults,
}

/// Default settings
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    /// Filesystem type for `mount`, `probe` and `smoke`
    pub fstype: Option<String>,

    /// Filesystem option string for `mount`, `probe` and `smoke`
    pub data: Option<String>,

    /// Parent directory for probe and smoke mountpoints
    pub probe_dir: Option<PathBuf>,

    /// Default verbosity level (0-3)
    pub verbosity: Option<u8>,
}

impl Config {
    /// Load configuration from the default path, or return empty config if not found.
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Config::default()),
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

/// Get the path to the configuration file.
///
/// Returns `None` when no home directory can be determined and no override is set.
pub fn config_path() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Some(PathBuf::from(dir).join("config.toml"));
    }

    let base_dirs = directories::BaseDirs::new()?;

    #[cfg(target_os = "macos")]
    {
        let config_dir = base_dirs
            .home_dir()
            .join("Library/Application Support/com.easymount.easymount");
        Some(config_dir.join("config.toml"))
    }

    #[cfg(not(target_os = "macos"))]
    {
        Some(base_dirs.config_dir().join("easymount").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [defaults]
            fstype = "tmpfs"
            data = "size=16M"
            probe_dir = "/var/tmp/easymount"
            verbosity = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.defaults.fstype.as_deref(), Some("tmpfs"));
        assert_eq!(config.defaults.data.as_deref(), Some("size=16M"));
        assert_eq!(
            config.defaults.probe_dir,
            Some(PathBuf::from("/var/tmp/easymount"))
        );
        assert_eq!(config.defaults.verbosity, Some(2));
    }

    #[test]
    fn test_parse_empty_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.defaults.fstype.is_none());
        assert!(config.defaults.probe_dir.is_none());
    }

    #[test]
    fn test_unknown_default_rejected() {
        let result: Result<Config, _> = toml::from_str("[defaults]\nbackend = \"fuse\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert!(config.defaults.data.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults]\nfstype = \"ramfs\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.defaults.fstype.as_deref(), Some("ramfs"));
    }

    #[test]
    fn test_invalid_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[defaults\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }
}
