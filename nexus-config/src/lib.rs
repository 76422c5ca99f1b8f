//! # Nexus Config
//!
//! Persistent, per-repository settings for talking to a Nexus rubygems
//! repository: server URL, authorization and proxy setting.
//!
//! ## Features
//!
//! - **Scoped records**: one YAML file holds independent records selected by a
//!   scope key, or a single unscoped record at the top level
//! - **Write-through**: every mutation rewrites the file atomically
//! - **Optional encryption**: the authorization is sealed with AES-256-GCM
//!   under a PBKDF2-derived key; the passphrase is never persisted
//! - **Secrets file**: secret fields can live in a separate file
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nexus_config::{open, Authorization, StoreLocation};
//! use std::path::PathBuf;
//!
//! # fn example() -> nexus_core::Result<()> {
//! let location = StoreLocation::new(PathBuf::from("/home/me/.gem/nexus")).with_scope("internal");
//! let mut store = open(&location, None)?;
//! store.set("url", "https://nexus.example.com/repository/gems")?;
//! store.set_authorization(Authorization::basic("alice", "s3cret"))?;
//! # Ok(())
//! # }
//! ```

pub mod authorization;
pub mod crypto;
pub mod file;
pub mod record;
pub mod store;

pub use authorization::Authorization;
pub use record::ConfigRecord;
pub use store::{open, ConfigStore, EncryptedConfigStore, Store, StoreLocation};

/// Field holding the repository URL.
pub const URL_FIELD: &str = "url";

/// Field holding the stored proxy setting.
pub const HTTP_PROXY_FIELD: &str = "http_proxy";
