use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// Errors raised while managing Nexus credentials and talking to the server.
///
/// No variant ever carries a password, a passphrase or an authorization
/// value in its message.
#[derive(Error, Debug)]
pub enum NexusError {
    Config(String),
    Io(#[from] std::io::Error),
    Serialization(String),
    /// Invalid answer to an interactive prompt, e.g. a URL without a host.
    UserInput(String),
    /// Wrong passphrase or corrupt ciphertext.
    Decryption(String),
    /// The record is encrypted but was opened without a passphrase.
    Locked,
    ProxyParse(String),
    Transport(String),
    InvalidMethod(String),
    Prompt(String),
    Other(#[from] anyhow::Error),
}

impl Display for NexusError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            NexusError::Config(s) => write!(f, "Configuration error: {}", s),
            NexusError::Io(e) => write!(f, "I/O error: {}", e),
            NexusError::Serialization(s) => write!(f, "Serialization error: {}", s),
            NexusError::UserInput(s) => write!(f, "{}", s),
            NexusError::Decryption(s) => {
                write!(f, "Could not decrypt the stored credentials: {}\n\n", s)?;
                write!(f, "Fix:\n")?;
                write!(f, "  • Check the encryption passphrase, or\n")?;
                write!(f, "  • Reset the stored credentials: nexus --nexus-clear setup")
            }
            NexusError::Locked => {
                write!(f, "The stored credentials are encrypted and no passphrase was given")
            }
            NexusError::ProxyParse(s) => write!(f, "Invalid proxy configuration: {}", s),
            NexusError::Transport(s) => write!(f, "Network error: {}", s),
            NexusError::InvalidMethod(s) => write!(f, "Unsupported HTTP method: {}", s),
            NexusError::Prompt(s) => write!(f, "Prompt failed: {}", s),
            NexusError::Other(e) => write!(f, "Other error: {}", e),
        }
    }
}

impl From<serde_yaml_ng::Error> for NexusError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        NexusError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NexusError>;
