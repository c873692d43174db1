use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::cache::coordinator::TokenCoordinator;
use crate::config::identity::ClientConfig;
use crate::error::{IdentityError, Result};
use crate::observability::metrics::get_metrics;
use crate::transport::{HttpTransport, Transport};

/// OpenStack Keystone (v2) identity client holding a cached admin token.
pub struct KeystoneClient<T: Transport = HttpTransport> {
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) transport: Arc<T>,
    pub(crate) coordinator: TokenCoordinator<T>,
}

impl<T: Transport> Clone for KeystoneClient<T> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            transport: self.transport.clone(),
            coordinator: self.coordinator.clone(),
        }
    }
}

impl KeystoneClient<HttpTransport> {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: Transport> KeystoneClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let config = Arc::new(config);
        let transport = Arc::new(transport);
        let coordinator = TokenCoordinator::new(transport.clone(), config.clone());
        Self { config, transport, coordinator }
    }

    pub fn with_trust_window(config: ClientConfig, transport: T, trust_window: Duration) -> Self {
        let config = Arc::new(config);
        let transport = Arc::new(transport);
        let coordinator = TokenCoordinator::with_trust_window(transport.clone(), config.clone(), trust_window);
        Self { config, transport, coordinator }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &TokenCoordinator<T> {
        &self.coordinator
    }

    /// Configured extra query arguments, skipping any that `overrides` redefines.
    pub(crate) fn query_args<'a>(&'a self, overrides: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
        self.config
            .extra_args
            .iter()
            .filter(|(key, _)| !overrides.iter().any(|(k, _)| *k == key.as_str()))
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .chain(overrides.iter().copied())
            .collect()
    }
}

/// Logs an unexpected-status error carrying a body. With `not_found_expected`
/// a 404 is logged at debug level since it answers "no such token/tenant".
pub(crate) fn log_unexpected_status(operation: &str, err: &IdentityError, not_found_expected: bool, tenant_id: &str) {
    let (Some(code), Some(body)) = (err.status(), err.body()) else {
        return;
    };
    if not_found_expected && code == 404 {
        debug!(operation, code, tenant_id, body = %body, "Authentication API returned an unexpected status code");
    } else {
        error!(operation, code, tenant_id, body = %body, "Authentication API returned an unexpected status code");
    }
}

/// Counts the outcome of an identity operation.
pub(crate) async fn observe<R>(operation: &'static str, result: Result<R>) -> Result<R> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) => err.reason(),
    };
    get_metrics()
        .await
        .identity_requests
        .with_label_values(&[operation, outcome])
        .inc();
    result
}
