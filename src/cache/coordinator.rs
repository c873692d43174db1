//! Admin token cache with single-flight refresh.
//!
//! Callers ask for a fresh token. Within the trust window the cached token is
//! returned as is. Past it, callers queue up behind one refresh task and all of
//! them receive that refresh's outcome, in registration order.
//!
//! # Invariants
//! - at most one refresh is in flight; the waiter queue is non-empty iff one is
//! - the trust window restarts on every completed refresh, failed ones included
//! - the refresh timestamp is stamped before any waiter is notified

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, Mutex};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::token::TokenState;
use crate::config::identity::ClientConfig;
use crate::error::{IdentityError, Result};
use crate::helpers::time::expires_to_unix;
use crate::observability::metrics::get_metrics;
use crate::transport::{endpoint_url, Transport, TransportRequest};
use crate::utils::constants::TRUST_TOKEN_FOR;

/// What every waiter of one refresh receives.
pub type RefreshOutcome = Result<Option<String>>;

pub struct TokenCoordinator<T: Transport> {
    shared: Arc<Shared<T>>,
}

impl<T: Transport> Clone for TokenCoordinator<T> {
    fn clone(&self) -> Self {
        Self { shared: self.shared.clone() }
    }
}

struct Shared<T> {
    transport: Arc<T>,
    config: Arc<ClientConfig>,
    trust_window: Duration,
    state: Mutex<CoordinatorState>,
}

#[derive(Default)]
struct CoordinatorState {
    token: TokenState,
    token_updated: Option<Instant>,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

impl CoordinatorState {
    fn is_fresh(&self, trust_window: Duration) -> bool {
        self.token_updated
            .is_some_and(|updated| updated.elapsed() < trust_window)
    }
}

impl<T: Transport> TokenCoordinator<T> {
    pub fn new(transport: Arc<T>, config: Arc<ClientConfig>) -> Self {
        Self::with_trust_window(transport, config, TRUST_TOKEN_FOR)
    }

    pub fn with_trust_window(transport: Arc<T>, config: Arc<ClientConfig>, trust_window: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                transport,
                config,
                trust_window,
                state: Mutex::new(CoordinatorState::default()),
            }),
        }
    }

    /// Returns the admin token, refreshing it first when the trust window has elapsed.
    ///
    /// `Ok(None)` means no refresh has succeeded yet and the last failure is
    /// still inside the trust window.
    pub async fn ensure_fresh_token(&self) -> RefreshOutcome {
        let metrics = get_metrics().await;

        let receiver = {
            let mut state = self.shared.state.lock().await;
            if state.is_fresh(self.shared.trust_window) {
                metrics.token_cache_hits.inc();
                return Ok(state.token.token.clone());
            }

            let (sender, receiver) = oneshot::channel();
            state.waiters.push(sender);
            if state.waiters.len() == 1 {
                tokio::spawn(self.shared.clone().refresh());
            } else {
                debug!("joining in-flight token refresh, waiters: {}", state.waiters.len());
            }
            receiver
        };

        receiver
            .await
            .unwrap_or_else(|_| Err(IdentityError::transport("token refresh was aborted")))
    }

    /// Like [`Self::ensure_fresh_token`], but a failed refresh falls back to
    /// whatever token is cached.
    pub async fn fresh_or_cached_token(&self) -> Option<String> {
        match self.ensure_fresh_token().await {
            Ok(token) => token,
            Err(err) => {
                debug!("using cached admin token after failed refresh: {}", err);
                self.snapshot().await.token
            }
        }
    }

    /// Ensures freshness, then returns the whole cached state.
    pub async fn fresh_state(&self) -> Result<TokenState> {
        self.ensure_fresh_token().await?;
        Ok(self.snapshot().await)
    }

    /// Cached state without triggering a refresh.
    pub async fn snapshot(&self) -> TokenState {
        self.shared.state.lock().await.token.clone()
    }

    /// Number of callers waiting on the in-flight refresh.
    pub async fn pending_waiters(&self) -> usize {
        self.shared.state.lock().await.waiters.len()
    }
}

impl<T: Transport> Shared<T> {
    async fn refresh(self: Arc<Self>) {
        let metrics = get_metrics().await;
        metrics.token_refresh_requests.inc();
        let start = Instant::now();
        info!(username = self.config.credentials.username(), "refreshing admin token");

        let outcome = self.request_token().await;
        metrics.token_refresh_duration.observe(start.elapsed().as_secs_f64());

        let (waiters, result) = {
            let mut state = self.state.lock().await;
            state.token_updated = Some(Instant::now());
            let result = match outcome {
                Ok(token) => {
                    if let Some(expires) = token.expires.as_deref().and_then(expires_to_unix) {
                        metrics.token_expiry_unix.set(expires);
                    }
                    state.token = token;
                    info!(
                        expires = state.token.expires.as_deref().unwrap_or("unknown"),
                        catalog_entries = state.token.service_catalog.len(),
                        "admin token refreshed"
                    );
                    Ok(state.token.token.clone())
                }
                Err(err) => {
                    warn!("admin token refresh failed: {}", err);
                    metrics.token_refresh_failures.with_label_values(&[err.reason()]).inc();
                    Err(err)
                }
            };
            (std::mem::take(&mut state.waiters), result)
        };

        metrics.token_refresh_waiters.observe(waiters.len() as f64);
        for waiter in waiters {
            // a dropped receiver only means that caller went away
            let _ = waiter.send(result.clone());
        }
    }

    async fn request_token(&self) -> Result<TokenState> {
        let url = endpoint_url(&self.config.base_url, &["tokens"], &[])?;
        let request = TransportRequest::post_json(url, self.config.credentials.auth_payload());
        let response = self.transport.send(request).await?;
        TokenState::from_access_body(&response.body)
    }
}
