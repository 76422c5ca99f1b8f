//! Central registry for all user-facing message templates.
//!
//! This module is organized by domain:
//! - `credentials` - URL, sign-in and encryption prompts and notices
//! - `request` - verbose request diagnostics
//! - `common` - shared messages used by the CLI
//!
//! Templates use `{variable}` syntax for runtime values, which are
//! substituted by the `MessageBuilder`.

mod common;
mod credentials;
mod request;

pub use common::{CommonMessages, COMMON_MESSAGES};
pub use credentials::{CredentialMessages, CREDENTIAL_MESSAGES};
pub use request::{RequestMessages, REQUEST_MESSAGES};

/// Unified messages struct containing all domain-specific message modules
pub struct Messages {
    pub credentials: CredentialMessages,
    pub request: RequestMessages,
    pub common: CommonMessages,
}

/// Global messages constant - main entry point for all message templates
pub const MESSAGES: Messages = Messages {
    credentials: CREDENTIAL_MESSAGES,
    request: REQUEST_MESSAGES,
    common: COMMON_MESSAGES,
};
