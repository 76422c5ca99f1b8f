//! Well-known file locations.

use crate::error::{NexusError, Result};
use std::path::{Path, PathBuf};

/// Default config file, relative to the user's home directory.
const DEFAULT_CONFIG_FILE: &[&str] = &[".gem", "nexus"];

/// Get the user's home directory
pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| NexusError::Config("Could not determine home directory".into()))
}

/// Default location of the Nexus config file (`~/.gem/nexus`)
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = home_dir()?;
    for part in DEFAULT_CONFIG_FILE {
        path.push(part);
    }
    Ok(path)
}

/// Expand a leading `~` and make the path absolute against the current directory.
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => home_dir()?.join(rest),
        Err(_) => path.to_path_buf(),
    };
    if expanded.is_absolute() {
        Ok(expanded)
    } else {
        Ok(std::env::current_dir()?.join(expanded))
    }
}
