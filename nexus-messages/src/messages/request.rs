//! Verbose request diagnostics

pub struct RequestMessages {
    pub target: &'static str,
    pub use_authorization: &'static str,
    pub no_authorization: &'static str,
    pub use_proxy: &'static str,
}

pub const REQUEST_MESSAGES: RequestMessages = RequestMessages {
    target: "{method} {url}",
    use_authorization: "use authorization",
    no_authorization: "no authorization",
    use_proxy: "use proxy at {host}:{port}",
};
