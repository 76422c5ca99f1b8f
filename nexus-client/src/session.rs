//! Per-invocation state

use crate::proxy::ProxySpec;
use nexus_config::{Authorization, Store, StoreLocation};

/// State resolved while running one command.
///
/// Built fresh for every invocation and dropped at its end; nothing here is
/// cached between runs.
pub struct Session {
    pub location: StoreLocation,
    pub store: Box<dyn Store>,
    pub proxy: Option<ProxySpec>,
    /// Credentials entered this run that must not be persisted.
    pub transient_authorization: Option<Authorization>,
}

impl Session {
    pub fn new(location: StoreLocation, store: Box<dyn Store>) -> Self {
        Self {
            location,
            store,
            proxy: None,
            transient_authorization: None,
        }
    }
}
