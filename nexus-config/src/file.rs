//! Whole-file load and atomic save of the YAML mapping

use nexus_core::{NexusError, Result};
use serde_yaml_ng::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory permissions for a freshly created config directory
#[cfg(unix)]
const DIR_PERMISSIONS: u32 = 0o700;

/// File permissions for config and secrets files
#[cfg(unix)]
const FILE_PERMISSIONS: u32 = 0o600;

/// One YAML file, loaded fully into memory.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: PathBuf,
    root: Mapping,
}

impl ConfigFile {
    /// Load the mapping at `path`; a missing or empty file is an empty mapping.
    pub fn load(path: &Path) -> Result<Self> {
        let root = if path.exists() {
            let content = fs::read_to_string(path)?;
            match serde_yaml_ng::from_str::<Value>(&content)? {
                Value::Mapping(map) => map,
                Value::Null => Mapping::new(),
                _ => {
                    return Err(NexusError::Config(format!(
                        "{} does not contain a mapping",
                        path.display()
                    )))
                }
            }
        } else {
            Mapping::new()
        };
        debug!(path = %path.display(), entries = root.len(), "Loaded config file");

        Ok(Self {
            path: path.to_path_buf(),
            root,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The record for `scope`, or the top-level mapping when unscoped.
    pub fn record(&self, scope: Option<&str>) -> Option<&Mapping> {
        match scope {
            None => Some(&self.root),
            Some(key) => self.root.get(key).and_then(Value::as_mapping),
        }
    }

    /// Mutable record for `scope`, created empty if absent.
    pub fn record_mut(&mut self, scope: Option<&str>) -> Result<&mut Mapping> {
        let Some(key) = scope else {
            return Ok(&mut self.root);
        };
        let entry = self
            .root
            .entry(Value::String(key.to_string()))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if entry.is_null() {
            *entry = Value::Mapping(Mapping::new());
        }
        entry.as_mapping_mut().ok_or_else(|| {
            NexusError::Config(format!("scope '{}' is not a mapping", key))
        })
    }

    /// Write the full mapping back, replacing the file atomically.
    pub fn save(&self) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if !parent.exists() {
            fs::create_dir_all(&parent)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                fs::set_permissions(&parent, fs::Permissions::from_mode(DIR_PERMISSIONS))?;
            }
        }

        let content = serde_yaml_ng::to_string(&self.root)?;
        let mut temp = tempfile::NamedTempFile::new_in(&parent)?;
        std::io::Write::write_all(&mut temp, content.as_bytes())?;
        temp.persist(&self.path).map_err(|e| NexusError::Io(e.error))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(FILE_PERMISSIONS))?;
        }

        debug!(path = %self.path.display(), "Saved config file");
        Ok(())
    }

    /// Top-level mapping, for inspection.
    pub fn root(&self) -> &Mapping {
        &self.root
    }
}
