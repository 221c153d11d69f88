// src/state.rs
// Shared application state handed to every request handler

use std::sync::Arc;

use crate::coercion::ValuePolicy;
use crate::config::Credentials;
use crate::device::{HeatPump, ParamCatalog};
use crate::session::DeviceSession;

/// Built once at startup; only the session's connection state changes afterwards
#[derive(Clone)]
pub struct AppState {
    pub session: DeviceSession,
    pub catalog: Arc<ParamCatalog>,
    pub policy: ValuePolicy,
    /// Range-check writes and have the driver read them back
    pub verify: bool,
    /// Basic auth credentials; `None` disables authentication
    pub credentials: Option<Arc<Credentials>>,
}

impl AppState {
    pub fn new(device: impl HeatPump + 'static, catalog: ParamCatalog) -> Self {
        Self {
            session: DeviceSession::new(device),
            catalog: Arc::new(catalog),
            policy: ValuePolicy::default(),
            verify: true,
            credentials: None,
        }
    }

    pub fn with_policy(mut self, policy: ValuePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    pub fn with_credentials(mut self, credentials: Option<Credentials>) -> Self {
        self.credentials = credentials.map(Arc::new);
        self
    }

    /// Read-only marker for request logs
    pub fn ro_tag(&self) -> &'static str {
        if self.policy.read_only {
            " (read-only)"
        } else {
            ""
        }
    }
}
