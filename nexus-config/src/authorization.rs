//! The stored authorization value.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::fmt;

/// What the record says about credentials.
///
/// `AlwaysPrompt` is persisted separately from any token, so a real
/// credential can never be mistaken for the marker.
#[derive(Clone, PartialEq, Eq, Default)]
pub enum Authorization {
    #[default]
    None,
    Token(String),
    /// Never store credentials; ask for them on every invocation.
    AlwaysPrompt,
}

impl Authorization {
    /// Build a `Basic` token from a username and password.
    ///
    /// The base64 text carries no line breaks or other whitespace.
    pub fn basic(username: &str, password: &str) -> Self {
        let encoded: String = STANDARD
            .encode(format!("{username}:{password}"))
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        Authorization::Token(format!("Basic {encoded}"))
    }

    /// The header value, if a credential is stored.
    pub fn token(&self) -> Option<&str> {
        match self {
            Authorization::Token(token) => Some(token),
            _ => None,
        }
    }

    pub fn is_always_prompt(&self) -> bool {
        matches!(self, Authorization::AlwaysPrompt)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Authorization::None)
    }

    /// Recover `(username, password)` from a `Basic` token.
    pub fn basic_credentials(&self) -> Option<(String, String)> {
        let encoded = self.token()?.strip_prefix("Basic ")?;
        let decoded = String::from_utf8(STANDARD.decode(encoded).ok()?).ok()?;
        let (username, password) = decoded.split_once(':')?;
        Some((username.to_string(), password.to_string()))
    }
}

impl fmt::Debug for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authorization::None => write!(f, "None"),
            Authorization::Token(_) => write!(f, "Token(<redacted>)"),
            Authorization::AlwaysPrompt => write!(f, "AlwaysPrompt"),
        }
    }
}
