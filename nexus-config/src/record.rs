//! A scoped view over the config file and the optional secrets file

use crate::file::ConfigFile;
use nexus_core::Result;
use serde_yaml_ng::{Mapping, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub(crate) const AUTHORIZATION_FIELD: &str = "authorization";
pub(crate) const ALWAYS_PROMPT_FIELD: &str = "always_prompt";
pub(crate) const ENCRYPTED_FIELD: &str = "encrypted";
pub(crate) const SALT_FIELD: &str = "salt";
pub(crate) const SECRETS_FIELD: &str = "secrets";

/// Fields that live in the secrets file when one is configured.
const SECRET_FIELDS: &[&str] = &[
    AUTHORIZATION_FIELD,
    ALWAYS_PROMPT_FIELD,
    ENCRYPTED_FIELD,
    SALT_FIELD,
];

/// Fields managed by the store itself rather than through `get`/`set`.
pub(crate) const RESERVED_FIELDS: &[&str] = &[
    AUTHORIZATION_FIELD,
    ALWAYS_PROMPT_FIELD,
    ENCRYPTED_FIELD,
    SALT_FIELD,
    SECRETS_FIELD,
];

/// One scope's settings.
///
/// Reads come from memory; every [`ConfigRecord::apply`] writes the touched
/// files back in full. Records of other scopes in the same file are carried
/// along untouched.
#[derive(Debug, Clone)]
pub struct ConfigRecord {
    scope: Option<String>,
    config: ConfigFile,
    secrets: Option<ConfigFile>,
}

impl ConfigRecord {
    /// Load the record for `scope` from `config_path`.
    ///
    /// `secrets_path` overrides the secrets file remembered in the record;
    /// a newly given secrets file is remembered and receives any secret
    /// fields still held in the main file.
    pub fn open(config_path: &Path, scope: Option<&str>, secrets_path: Option<&Path>) -> Result<Self> {
        let config = ConfigFile::load(config_path)?;
        let mut record = Self {
            scope: scope.map(str::to_string),
            config,
            secrets: None,
        };

        let remembered = record.config_field(SECRETS_FIELD).and_then(value_to_string);
        let secrets_path: Option<PathBuf> = match secrets_path {
            Some(path) => Some(path.to_path_buf()),
            None => remembered.as_deref().map(PathBuf::from),
        };

        if let Some(path) = secrets_path.filter(|p| p != config_path) {
            record.secrets = Some(ConfigFile::load(&path)?);
            let path_text = path.display().to_string();
            if remembered.as_deref() != Some(path_text.as_str()) {
                record.adopt_secrets_file(&path_text)?;
            }
        }

        debug!(
            path = %config_path.display(),
            scope = ?record.scope,
            secrets = record.secrets.is_some(),
            "Opened config record"
        );
        Ok(record)
    }

    /// Remember the secrets file and move secret fields into it.
    fn adopt_secrets_file(&mut self, path_text: &str) -> Result<()> {
        let scope = self.scope.clone();
        let moved: Vec<(Value, Value)> = match self.config.record(scope.as_deref()) {
            Some(map) => SECRET_FIELDS
                .iter()
                .filter_map(|f| map.get(*f).map(|v| (Value::from(*f), v.clone())))
                .collect(),
            None => Vec::new(),
        };

        let main = self.config.record_mut(scope.as_deref())?;
        main.insert(SECRETS_FIELD.into(), path_text.into());
        for (key, _) in &moved {
            main.remove(key);
        }

        if let Some(secrets) = self.secrets.as_mut() {
            let target = secrets.record_mut(scope.as_deref())?;
            for (key, value) in moved {
                target.insert(key, value);
            }
            secrets.save()?;
        }
        self.config.save()?;
        info!(secrets = %path_text, "Secret fields now stored in a separate file");
        Ok(())
    }

    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    pub fn config_path(&self) -> &Path {
        self.config.path()
    }

    /// File that holds the secret fields.
    pub fn secrets_path(&self) -> &Path {
        self.file_for(AUTHORIZATION_FIELD).path()
    }

    fn file_for(&self, field: &str) -> &ConfigFile {
        match &self.secrets {
            Some(secrets) if SECRET_FIELDS.contains(&field) => secrets,
            _ => &self.config,
        }
    }

    fn config_field(&self, field: &str) -> Option<&Value> {
        self.config.record(self.scope.as_deref())?.get(field)
    }

    /// Raw value of a field.
    pub fn value(&self, field: &str) -> Option<&Value> {
        self.file_for(field)
            .record(self.scope.as_deref())
            .and_then(|map: &Mapping| map.get(field))
            .filter(|v| !v.is_null())
    }

    /// Value of a scalar field as text.
    pub fn get(&self, field: &str) -> Option<String> {
        self.value(field).and_then(value_to_string)
    }

    pub fn has(&self, field: &str) -> bool {
        self.value(field).is_some()
    }

    pub fn flag(&self, field: &str) -> bool {
        matches!(self.value(field), Some(Value::Bool(true)))
    }

    /// Set (`Some`) or delete (`None`) several fields, then persist.
    pub fn apply(&mut self, changes: &[(&str, Option<Value>)]) -> Result<()> {
        let scope = self.scope.clone();
        let mut touched_config = false;
        let mut touched_secrets = false;

        for (field, value) in changes {
            let to_secrets = self.secrets.is_some() && SECRET_FIELDS.contains(field);
            let file = match self.secrets.as_mut() {
                Some(secrets) if to_secrets => secrets,
                _ => &mut self.config,
            };
            let map = file.record_mut(scope.as_deref())?;
            match value {
                Some(value) => {
                    map.insert(Value::from(*field), value.clone());
                }
                None => {
                    map.remove(*field);
                }
            }
            if to_secrets {
                touched_secrets = true;
            } else {
                touched_config = true;
            }
        }

        if touched_config {
            self.config.save()?;
        }
        if touched_secrets {
            if let Some(secrets) = &self.secrets {
                secrets.save()?;
            }
        }
        Ok(())
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
