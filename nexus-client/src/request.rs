//! Building and sending requests to the Nexus server

use crate::proxy::ProxySpec;
use nexus_config::Authorization;
use nexus_core::{nexus_info, NexusError, Result};
use nexus_messages::{msg, MESSAGES};
use reqwest::blocking::{Client, RequestBuilder as HttpRequest, Response};
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use reqwest::{Method, Proxy};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Large gems over slow VPN links need a long read timeout.
const READ_TIMEOUT: Duration = Duration::from_secs(300);

const DEFAULT_USER_AGENT: &str = concat!("nexus-gem/", env!("CARGO_PKG_VERSION"));

/// The request methods the Nexus gem API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    fn as_method(self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = NexusError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(NexusError::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method().as_str())
    }
}

/// Sends requests relative to the repository URL.
///
/// The authorization is not attached automatically; callers add it in the
/// customize hook with [`RequestBuilder::authorize`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    authorization: Authorization,
    proxy: Option<ProxySpec>,
    verbosity: u8,
    user_agent: Option<String>,
    timeout: Duration,
}

impl RequestBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            authorization: Authorization::None,
            proxy: None,
            verbosity: 0,
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            timeout: READ_TIMEOUT,
        }
    }

    pub fn with_authorization(mut self, authorization: Authorization) -> Self {
        self.authorization = authorization;
        self
    }

    pub fn with_proxy(mut self, proxy: Option<ProxySpec>) -> Self {
        self.proxy = proxy;
        self
    }

    /// Print request diagnostics when `verbosity > 0`.
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Don't send a `User-Agent` header.
    pub fn without_user_agent(mut self) -> Self {
        self.user_agent = None;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `base_url + "/" + path`, with leading slashes of `path` collapsed so
    /// `"/gems"` and `"gems"` name the same resource.
    pub fn target_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attach the session's authorization header, if any.
    pub fn authorize(&self, request: HttpRequest) -> HttpRequest {
        match self.authorization.token() {
            Some(token) => request.header(AUTHORIZATION, token),
            None => request,
        }
    }

    pub fn make_request(&self, method: HttpMethod, path: &str) -> Result<Response> {
        self.make_request_with(method, path, |request| request)
    }

    /// Send a request, letting `customize` add headers or a body first.
    ///
    /// The response is returned whatever its status.
    pub fn make_request_with<F>(&self, method: HttpMethod, path: &str, customize: F) -> Result<Response>
    where
        F: FnOnce(HttpRequest) -> HttpRequest,
    {
        let url = self.target_url(path);
        let client = self.client()?;

        let mut request = client.request(method.as_method(), &url);
        if let Some(agent) = &self.user_agent {
            request = request.header(USER_AGENT, agent.as_str());
        }
        let request = customize(request);

        self.log_request(method, &url);

        request
            .send()
            .map_err(|e| NexusError::Transport(e.without_url().to_string()))
    }

    fn client(&self) -> Result<Client> {
        let mut builder = Client::builder().timeout(self.timeout);
        builder = match &self.proxy {
            Some(spec) => {
                let mut proxy = Proxy::all(spec.address())
                    .map_err(|e| NexusError::ProxyParse(e.to_string()))?;
                if let Some(user) = &spec.user {
                    proxy = proxy.basic_auth(user, spec.password.as_deref().unwrap_or(""));
                }
                builder.proxy(proxy)
            }
            None => builder.no_proxy(),
        };
        builder
            .build()
            .map_err(|e| NexusError::Transport(e.to_string()))
    }

    fn log_request(&self, method: HttpMethod, url: &str) {
        let authorized = self.authorization.token().is_some();
        debug!(
            method = %method,
            url = %url,
            authorized,
            proxy = ?self.proxy.as_ref().map(|p| (&p.host, p.port)),
            "Sending request"
        );

        if self.verbosity == 0 {
            return;
        }
        nexus_info!(
            "{}",
            msg!(MESSAGES.request.target, method = method.to_string(), url = url)
        );
        if authorized {
            nexus_info!("{}", MESSAGES.request.use_authorization);
        } else {
            nexus_info!("{}", MESSAGES.request.no_authorization);
        }
        if let Some(proxy) = &self.proxy {
            nexus_info!(
                "{}",
                msg!(
                    MESSAGES.request.use_proxy,
                    host = proxy.host.as_str(),
                    port = proxy.port.to_string()
                )
            );
        }
    }
}
