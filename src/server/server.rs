use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tracing::info;

use crate::config::settings::SettingsConfig;
use crate::identity::KeystoneClient;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::handlers;
use crate::transport::Transport;

pub struct AppState<T: Transport> {
    pub metrics_state: MetricsState,
    pub client: KeystoneClient<T>,
}

impl<T: Transport> Clone for AppState<T> {
    fn clone(&self) -> Self {
        Self { metrics_state: self.metrics_state.clone(), client: self.client.clone() }
    }
}

impl<T: Transport> AppState<T> {
    pub fn new(metrics: &Metrics, client: KeystoneClient<T>) -> Self {
        Self { metrics_state: MetricsState::new(metrics.registry.clone()), client }
    }
}

/// Routes exposing the identity operations to local callers.
pub fn router<T: Transport>(settings_config: &SettingsConfig, state: AppState<T>) -> Router {
    Router::new()
        .route("/admin/token", get(handlers::admin_token::<T>))
        .route("/catalog", get(handlers::service_catalog::<T>))
        .route("/tenants/{tenant_id}", get(handlers::tenant_info::<T>))
        .route("/tokens/{token}", get(handlers::validate_token::<T>))
        .merge(state.metrics_state.router(&settings_config.metrics))
        .with_state(state)
}

/// Start the HTTP server; returns on ctrl-c.
pub async fn start<T: Transport>(settings_config: &SettingsConfig, client: KeystoneClient<T>) -> Result<()> {
    let metrics = get_metrics().await;
    let app = router(settings_config, AppState::new(metrics, client));

    let bind_addr = format!("{}:{}", settings_config.server.host, settings_config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", bind_addr))?;
    info!("listening on {}", bind_addr);
    metrics.up.set(1);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    metrics.up.set(0);
    Ok(())
}
