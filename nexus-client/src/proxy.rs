//! Outbound proxy resolution

use nexus_core::{NexusError, Result};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;
use url::Url;

/// Key-value lookup, used for the process environment.
pub trait Lookup {
    fn lookup(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Lookup for ProcessEnv {
    fn lookup(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl Lookup for HashMap<String, String> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// The stored `http_proxy` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxySetting {
    /// Never use a proxy, whatever the environment says.
    Disabled,
    Url(String),
}

impl ProxySetting {
    /// Interpret a stored value; `no_proxy` (or `:no_proxy`) disables proxying.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "" => None,
            "no_proxy" | ":no_proxy" => Some(ProxySetting::Disabled),
            other => Some(ProxySetting::Url(other.to_string())),
        }
    }
}

/// Proxy host, port and optional credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxySpec {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl ProxySpec {
    /// Proxy address without credentials.
    pub fn address(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for ProxySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySpec")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Picks the proxy for a target URL.
///
/// Precedence: `no_proxy`/`NO_PROXY` host match, then the stored setting,
/// then the lower-case and upper-case environment variable for the scheme.
pub struct ProxyResolver<'a> {
    env: &'a dyn Lookup,
    setting: Option<ProxySetting>,
}

impl<'a> ProxyResolver<'a> {
    pub fn new(env: &'a dyn Lookup, setting: Option<ProxySetting>) -> Self {
        Self { env, setting }
    }

    /// Proxy for `target`, or `None` for a direct connection.
    ///
    /// An unparsable target resolves to `None`; a malformed proxy string is
    /// a [`NexusError::ProxyParse`].
    pub fn resolve(&self, target: &str) -> Result<Option<ProxySpec>> {
        let Ok(target) = Url::parse(target) else {
            debug!("Target URL does not parse, using a direct connection");
            return Ok(None);
        };

        if let Some(host) = target.host_str() {
            if self.excluded(host) {
                debug!(host = %host, "Host listed in no_proxy");
                return Ok(None);
            }
        }

        let key = if target.scheme() == "http" {
            "http_proxy"
        } else {
            "https_proxy"
        };

        let (source, proxy) = match &self.setting {
            Some(ProxySetting::Disabled) => return Ok(None),
            Some(ProxySetting::Url(url)) => ("stored http_proxy setting".to_string(), url.clone()),
            None => match self.env_value(key) {
                Some(found) => found,
                None => return Ok(None),
            },
        };

        let spec = parse_proxy(&proxy).map_err(|reason| {
            NexusError::ProxyParse(format!("{} from {}", reason, source))
        })?;
        debug!(host = %spec.host, port = spec.port, source = %source, "Resolved proxy");
        Ok(Some(spec))
    }

    fn excluded(&self, host: &str) -> bool {
        let Some(list) = self.non_empty("no_proxy").or_else(|| self.non_empty("NO_PROXY")) else {
            return false;
        };
        list.split(',').map(str::trim).any(|entry| entry == host)
    }

    fn env_value(&self, key: &str) -> Option<(String, String)> {
        let upper = key.to_uppercase();
        self.non_empty(key)
            .map(|v| (format!("{key} environment variable"), v))
            .or_else(|| {
                self.non_empty(&upper)
                    .map(|v| (format!("{upper} environment variable"), v))
            })
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        self.env.lookup(key).filter(|v| !v.trim().is_empty())
    }
}

/// Parse a proxy string; the error text never repeats the input, which may
/// embed a password.
fn parse_proxy(proxy: &str) -> std::result::Result<ProxySpec, String> {
    let proxy = proxy.trim();
    let with_scheme = if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{proxy}")
    };
    let url = Url::parse(&with_scheme).map_err(|e| format!("invalid proxy URL ({e})"))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| "proxy URL has no host".to_string())?;
    let port = url.port_or_known_default().unwrap_or(80);
    let user = Some(url.username())
        .filter(|u| !u.is_empty())
        .map(str::to_string);

    Ok(ProxySpec {
        host: host.to_string(),
        port,
        user,
        password: url.password().map(str::to_string),
    })
}
