//! Plain and encrypted stores over a [`ConfigRecord`]

use crate::authorization::Authorization;
use crate::crypto::{generate_salt, EncryptionKey};
use crate::record::{
    ConfigRecord, ALWAYS_PROMPT_FIELD, AUTHORIZATION_FIELD, ENCRYPTED_FIELD, RESERVED_FIELDS,
    SALT_FIELD,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use nexus_core::{NexusError, Result};
use serde_yaml_ng::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Where a store lives: config file, scope key and optional secrets file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    pub config_path: PathBuf,
    pub scope: Option<String>,
    pub secrets_path: Option<PathBuf>,
}

impl StoreLocation {
    pub fn new(config_path: PathBuf) -> Self {
        Self {
            config_path,
            scope: None,
            secrets_path: None,
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_secrets(mut self, secrets_path: PathBuf) -> Self {
        self.secrets_path = Some(secrets_path);
        self
    }
}

/// Access to one scope's settings.
///
/// `get`/`set`/`has` cover ordinary fields such as `url` and `http_proxy`;
/// the authorization goes through its own accessors so that an encrypted
/// store can seal and unseal it.
pub trait Store {
    /// Value of an ordinary field.
    fn get(&self, field: &str) -> Result<Option<String>>;

    /// Set an ordinary field and persist immediately.
    fn set(&mut self, field: &str, value: &str) -> Result<()>;

    /// Delete an ordinary field and persist immediately.
    fn remove(&mut self, field: &str) -> Result<()>;

    /// Whether a field is present, including `authorization`.
    fn has(&self, field: &str) -> bool;

    /// Whether the stored authorization is ciphertext.
    fn is_encrypted(&self) -> bool;

    fn authorization(&self) -> Result<Authorization>;

    fn set_authorization(&mut self, authorization: Authorization) -> Result<()>;

    fn record(&self) -> &ConfigRecord;

    /// File holding the authorization, for user notices.
    fn secrets_path(&self) -> &Path {
        self.record().secrets_path()
    }
}

/// Open the store at `location`, encrypted when a passphrase is given.
pub fn open(location: &StoreLocation, passphrase: Option<&str>) -> Result<Box<dyn Store>> {
    let record = ConfigRecord::open(
        &location.config_path,
        location.scope.as_deref(),
        location.secrets_path.as_deref(),
    )?;
    match passphrase {
        Some(passphrase) => Ok(Box::new(EncryptedConfigStore::new(record, passphrase)?)),
        None => Ok(Box::new(ConfigStore::new(record))),
    }
}

fn ensure_ordinary(field: &str) -> Result<()> {
    if RESERVED_FIELDS.contains(&field) {
        return Err(NexusError::Config(format!(
            "'{}' is managed by the store and cannot be accessed directly",
            field
        )));
    }
    Ok(())
}

fn has_field(record: &ConfigRecord, field: &str) -> bool {
    if field == AUTHORIZATION_FIELD {
        record.has(AUTHORIZATION_FIELD) || record.flag(ALWAYS_PROMPT_FIELD)
    } else {
        record.has(field)
    }
}

/// Authorization changes shared by both stores; `sealed` is the value
/// written for a token.
fn authorization_changes(
    authorization: &Authorization,
    sealed: Option<String>,
) -> Vec<(&'static str, Option<Value>)> {
    match authorization {
        Authorization::None => vec![(AUTHORIZATION_FIELD, None), (ALWAYS_PROMPT_FIELD, None)],
        Authorization::Token(_) => vec![
            (AUTHORIZATION_FIELD, sealed.map(Value::from)),
            (ALWAYS_PROMPT_FIELD, None),
        ],
        Authorization::AlwaysPrompt => vec![
            (AUTHORIZATION_FIELD, None),
            (ALWAYS_PROMPT_FIELD, Some(Value::Bool(true))),
        ],
    }
}

/// Store whose authorization is kept in plaintext.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    record: ConfigRecord,
}

impl ConfigStore {
    pub fn new(record: ConfigRecord) -> Self {
        Self { record }
    }
}

impl Store for ConfigStore {
    fn get(&self, field: &str) -> Result<Option<String>> {
        ensure_ordinary(field)?;
        Ok(self.record.get(field))
    }

    fn set(&mut self, field: &str, value: &str) -> Result<()> {
        ensure_ordinary(field)?;
        self.record.apply(&[(field, Some(Value::from(value)))])
    }

    fn remove(&mut self, field: &str) -> Result<()> {
        ensure_ordinary(field)?;
        self.record.apply(&[(field, None)])
    }

    fn has(&self, field: &str) -> bool {
        has_field(&self.record, field)
    }

    fn is_encrypted(&self) -> bool {
        self.record.flag(ENCRYPTED_FIELD)
    }

    fn authorization(&self) -> Result<Authorization> {
        if self.record.flag(ALWAYS_PROMPT_FIELD) {
            return Ok(Authorization::AlwaysPrompt);
        }
        match self.record.get(AUTHORIZATION_FIELD) {
            Some(_) if self.is_encrypted() => Err(NexusError::Locked),
            Some(token) => Ok(Authorization::Token(token)),
            None => Ok(Authorization::None),
        }
    }

    fn set_authorization(&mut self, authorization: Authorization) -> Result<()> {
        if self.is_encrypted() && authorization.token().is_some() {
            return Err(NexusError::Locked);
        }
        let sealed = authorization.token().map(str::to_string);
        self.record
            .apply(&authorization_changes(&authorization, sealed))
    }

    fn record(&self) -> &ConfigRecord {
        &self.record
    }
}

/// Store whose authorization is sealed with a passphrase-derived key.
///
/// The passphrase itself is only held for the derivation and never written.
pub struct EncryptedConfigStore {
    record: ConfigRecord,
    key: EncryptionKey,
}

impl EncryptedConfigStore {
    /// Wrap `record`, converting it to an encrypted record if it isn't one.
    ///
    /// A plaintext authorization already stored is re-encrypted.
    pub fn new(mut record: ConfigRecord, passphrase: &str) -> Result<Self> {
        if record.flag(ENCRYPTED_FIELD) {
            let salt = record
                .get(SALT_FIELD)
                .ok_or_else(|| NexusError::Config("encrypted record has no salt".into()))?;
            let salt = STANDARD
                .decode(salt)
                .map_err(|e| NexusError::Config(format!("invalid salt: {}", e)))?;
            let key = EncryptionKey::derive_from_password(passphrase, &salt)?;
            return Ok(Self { record, key });
        }

        let salt = generate_salt();
        let key = EncryptionKey::derive_from_password(passphrase, &salt)?;
        let mut changes: Vec<(&str, Option<Value>)> = vec![
            (ENCRYPTED_FIELD, Some(Value::Bool(true))),
            (SALT_FIELD, Some(Value::from(STANDARD.encode(salt)))),
        ];
        let migrated = match record.get(AUTHORIZATION_FIELD) {
            Some(plaintext) => {
                changes.push((AUTHORIZATION_FIELD, Some(Value::from(key.encrypt(&plaintext)?))));
                true
            }
            None => false,
        };
        record.apply(&changes)?;
        info!(
            path = %record.secrets_path().display(),
            migrated,
            "Enabled encryption for stored credentials"
        );

        Ok(Self { record, key })
    }

    /// Decrypt the authorization back to plaintext and drop the encryption marker.
    pub fn into_plain(mut self) -> Result<ConfigStore> {
        let authorization = self.authorization()?;
        let mut changes = authorization_changes(
            &authorization,
            authorization.token().map(str::to_string),
        );
        changes.push((ENCRYPTED_FIELD, None));
        changes.push((SALT_FIELD, None));
        self.record.apply(&changes)?;
        debug!(path = %self.record.secrets_path().display(), "Disabled encryption");
        Ok(ConfigStore::new(self.record))
    }
}

impl Store for EncryptedConfigStore {
    fn get(&self, field: &str) -> Result<Option<String>> {
        ensure_ordinary(field)?;
        Ok(self.record.get(field))
    }

    fn set(&mut self, field: &str, value: &str) -> Result<()> {
        ensure_ordinary(field)?;
        self.record.apply(&[(field, Some(Value::from(value)))])
    }

    fn remove(&mut self, field: &str) -> Result<()> {
        ensure_ordinary(field)?;
        self.record.apply(&[(field, None)])
    }

    fn has(&self, field: &str) -> bool {
        has_field(&self.record, field)
    }

    fn is_encrypted(&self) -> bool {
        true
    }

    fn authorization(&self) -> Result<Authorization> {
        if self.record.flag(ALWAYS_PROMPT_FIELD) {
            return Ok(Authorization::AlwaysPrompt);
        }
        match self.record.get(AUTHORIZATION_FIELD) {
            Some(sealed) => Ok(Authorization::Token(self.key.decrypt(&sealed)?)),
            None => Ok(Authorization::None),
        }
    }

    fn set_authorization(&mut self, authorization: Authorization) -> Result<()> {
        let sealed = match authorization.token() {
            Some(token) => Some(self.key.encrypt(token)?),
            None => None,
        };
        self.record
            .apply(&authorization_changes(&authorization, sealed))
    }

    fn record(&self) -> &ConfigRecord {
        &self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::ConfigFile;
    use tempfile::TempDir;

    fn location(dir: &TempDir, scope: Option<&str>) -> StoreLocation {
        let location = StoreLocation::new(dir.path().join("configrepo"));
        match scope {
            Some(scope) => location.with_scope(scope),
            None => location,
        }
    }

    #[test]
    fn test_store_the_config_per_key() {
        let dir = TempDir::new().expect("should create temp dir");

        open(&location(&dir, Some("first")), None)
            .and_then(|mut s| s.set("some", "thing"))
            .expect("should write first");
        open(&location(&dir, Some("second")), None)
            .and_then(|mut s| s.set("some", "otherthing"))
            .expect("should write second");
        open(&location(&dir, None), None)
            .and_then(|mut s| s.set("some", "nothing"))
            .expect("should write unscoped");

        let expected: Value = serde_yaml_ng::from_str(
            "first: {some: thing}\nsecond: {some: otherthing}\nsome: nothing\n",
        )
        .expect("valid yaml");
        let file = ConfigFile::load(&dir.path().join("configrepo")).expect("should load");
        assert_eq!(Value::Mapping(file.root().clone()), expected);
    }

    #[test]
    fn test_use_only_the_config_for_the_given_key() {
        let dir = TempDir::new().expect("should create temp dir");

        let mut first = open(&location(&dir, Some("first")), None).expect("open first");
        first.set("some", "thing").expect("set");

        let mut second = open(&location(&dir, Some("second")), None).expect("open second");
        assert_eq!(second.get("some").expect("get"), None);
        second.set("some", "otherthing").expect("set");

        let mut root = open(&location(&dir, None), None).expect("open unscoped");
        assert_eq!(root.get("some").expect("get"), None);
        root.set("some", "nothing").expect("set");

        let reopen = |scope| open(&location(&dir, scope), None).expect("reopen");
        assert_eq!(reopen(Some("first")).get("some").expect("get").as_deref(), Some("thing"));
        assert_eq!(
            reopen(Some("second")).get("some").expect("get").as_deref(),
            Some("otherthing")
        );
        assert_eq!(reopen(None).get("some").expect("get").as_deref(), Some("nothing"));
    }

    #[test]
    fn test_reserved_fields_are_not_reachable_through_get() {
        let dir = TempDir::new().expect("should create temp dir");
        let mut store = open(&location(&dir, None), None).expect("open");
        assert!(store.get("authorization").is_err());
        assert!(store.set("encrypted", "false").is_err());
    }

    #[test]
    fn test_plain_authorization_roundtrip() {
        let dir = TempDir::new().expect("should create temp dir");
        let mut store = open(&location(&dir, Some("a")), None).expect("open");
        assert!(!store.has("authorization"));

        store
            .set_authorization(Authorization::basic("alice", "s3cret"))
            .expect("should store");
        let store = open(&location(&dir, Some("a")), None).expect("reopen");
        assert!(store.has("authorization"));
        assert_eq!(
            store.authorization().expect("read").token(),
            Some("Basic YWxpY2U6czNjcmV0")
        );
    }

    #[test]
    fn test_always_prompt_is_not_a_token() {
        let dir = TempDir::new().expect("should create temp dir");
        let mut store = open(&location(&dir, None), None).expect("open");
        store
            .set_authorization(Authorization::basic("a", "b"))
            .expect("store token");
        store
            .set_authorization(Authorization::AlwaysPrompt)
            .expect("store marker");

        let store = open(&location(&dir, None), None).expect("reopen");
        assert!(store.has("authorization"));
        assert_eq!(store.authorization().expect("read"), Authorization::AlwaysPrompt);
    }

    #[test]
    fn test_clearing_authorization_removes_it() {
        let dir = TempDir::new().expect("should create temp dir");
        let mut store = open(&location(&dir, None), None).expect("open");
        store
            .set_authorization(Authorization::basic("a", "b"))
            .expect("store token");
        store.set_authorization(Authorization::None).expect("clear");
        assert!(!store.has("authorization"));
        assert!(store.authorization().expect("read").is_none());
    }

    #[test]
    fn test_encrypted_marker_survives_reopen_without_passphrase() {
        let dir = TempDir::new().expect("should create temp dir");
        {
            let mut store = open(&location(&dir, None), Some("behappy")).expect("open");
            store
                .set_authorization(Authorization::basic("alice", "s3cret"))
                .expect("store");
        }

        let plain = open(&location(&dir, None), None).expect("reopen");
        assert!(plain.is_encrypted());
        assert!(plain.has("authorization"));
        assert!(matches!(plain.authorization(), Err(NexusError::Locked)));
    }

    #[test]
    fn test_ciphertext_is_written_to_disk() {
        let dir = TempDir::new().expect("should create temp dir");
        let mut store = open(&location(&dir, None), Some("behappy")).expect("open");
        store
            .set_authorization(Authorization::basic("alice", "s3cret"))
            .expect("store");

        let raw = std::fs::read_to_string(dir.path().join("configrepo")).expect("read file");
        assert!(!raw.contains("YWxpY2U6czNjcmV0"));
        assert!(raw.contains("encrypted: true"));
    }

    #[test]
    fn test_encrypted_roundtrip_with_passphrase() {
        let dir = TempDir::new().expect("should create temp dir");
        {
            let mut store = open(&location(&dir, Some("repo")), Some("behappy")).expect("open");
            store
                .set_authorization(Authorization::basic("alice", "s3cret"))
                .expect("store");
        }

        let store = open(&location(&dir, Some("repo")), Some("behappy")).expect("reopen");
        assert_eq!(
            store.authorization().expect("decrypt").token(),
            Some("Basic YWxpY2U6czNjcmV0")
        );
    }

    #[test]
    fn test_wrong_passphrase_is_distinguishable_from_absent() {
        let dir = TempDir::new().expect("should create temp dir");
        {
            let mut store = open(&location(&dir, None), Some("right")).expect("open");
            store
                .set_authorization(Authorization::basic("alice", "s3cret"))
                .expect("store");
        }

        let store = open(&location(&dir, None), Some("wrong")).expect("reopen");
        assert!(matches!(
            store.authorization(),
            Err(NexusError::Decryption(_))
        ));
    }

    #[test]
    fn test_plaintext_is_migrated_when_encryption_starts() {
        let dir = TempDir::new().expect("should create temp dir");
        {
            let mut store = open(&location(&dir, None), None).expect("open");
            store.set("url", "http://asd").expect("url");
            store
                .set_authorization(Authorization::Token("something".into()))
                .expect("store");
            assert!(!store.is_encrypted());
        }

        let store = open(&location(&dir, None), Some("behappy")).expect("encrypt");
        assert!(store.is_encrypted());
        assert_eq!(
            store.authorization().expect("decrypt"),
            Authorization::Token("something".into())
        );

        let raw = std::fs::read_to_string(dir.path().join("configrepo")).expect("read file");
        assert!(!raw.contains("something"));
        assert!(raw.contains("http://asd"));
    }

    #[test]
    fn test_into_plain_reverts_encryption() {
        let dir = TempDir::new().expect("should create temp dir");
        let record =
            ConfigRecord::open(&dir.path().join("configrepo"), None, None).expect("open record");
        let mut store = EncryptedConfigStore::new(record, "behappy").expect("encrypt");
        store
            .set_authorization(Authorization::basic("alice", "s3cret"))
            .expect("store");

        let plain = store.into_plain().expect("decrypt in place");
        assert!(!plain.is_encrypted());

        let reopened = open(&location(&dir, None), None).expect("reopen");
        assert!(!reopened.is_encrypted());
        assert_eq!(
            reopened.authorization().expect("read").token(),
            Some("Basic YWxpY2U6czNjcmV0")
        );
    }

    #[test]
    fn test_plain_store_refuses_to_write_token_into_encrypted_record() {
        let dir = TempDir::new().expect("should create temp dir");
        open(&location(&dir, None), Some("behappy")).expect("encrypt");

        let mut plain = open(&location(&dir, None), None).expect("reopen");
        assert!(matches!(
            plain.set_authorization(Authorization::basic("a", "b")),
            Err(NexusError::Locked)
        ));
        plain
            .set_authorization(Authorization::AlwaysPrompt)
            .expect("marker needs no passphrase");
    }
}
