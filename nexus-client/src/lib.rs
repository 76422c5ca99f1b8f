//! # Nexus Client
//!
//! Credential setup and authenticated requests against a Nexus rubygems
//! repository.
//!
//! - [`ProxyResolver`] picks the outbound proxy from the stored setting and
//!   the `http_proxy`/`https_proxy`/`no_proxy` environment
//! - [`CredentialManager`] runs the setup flow: encryption passphrase, URL,
//!   sign-in
//! - [`RequestBuilder`] sends requests through the resolved proxy
//!
//! ## Usage
//!
//! ```rust,no_run
//! use nexus_client::{CredentialManager, HttpMethod, ProcessEnv, SetupOptions, TerminalPrompter};
//! use nexus_config::StoreLocation;
//! use std::path::PathBuf;
//!
//! # fn example() -> nexus_core::Result<()> {
//! let location = StoreLocation::new(PathBuf::from("/home/me/.gem/nexus"));
//! let mut manager = CredentialManager::new(
//!     location,
//!     SetupOptions::default(),
//!     TerminalPrompter::new(),
//!     Box::new(ProcessEnv),
//! )?;
//! manager.setup()?;
//!
//! let builder = manager.request_builder(0)?;
//! let response = builder.make_request_with(HttpMethod::Get, "api/v1/gems", |req| {
//!     builder.authorize(req)
//! })?;
//! println!("{}", response.status());
//! # Ok(())
//! # }
//! ```

pub mod manager;
pub mod prompt;
pub mod proxy;
pub mod request;
pub mod session;

pub use manager::{CredentialManager, SetupOptions};
pub use prompt::{Prompter, ScriptedPrompter, TerminalPrompter};
pub use proxy::{Lookup, ProcessEnv, ProxyResolver, ProxySetting, ProxySpec};
pub use request::{HttpMethod, RequestBuilder};
pub use session::Session;
