//! Tenant and service catalog lookups backed by the admin token.

use serde::Serialize;
use serde_json::Value;

use crate::cache::catalog::CatalogEntry;
use crate::error::{IdentityError, Result};
use crate::identity::client::{log_unexpected_status, observe, KeystoneClient};
use crate::transport::{endpoint_url, Transport, TransportRequest};
use crate::utils::constants::CLOUD_SERVERS_ENTRIES;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantIdAndToken {
    pub token: Option<String>,
    pub expires: Option<String>,
    #[serde(rename = "tenantId")]
    pub tenant_id: Option<String>,
}

impl<T: Transport> KeystoneClient<T> {
    /// `GET /tenants/{tenant_id}`, returns the `tenant` object.
    pub async fn tenant_info(&self, tenant_id: &str) -> Result<Value> {
        let result: Result<Value> = async {
            let admin_token = self.coordinator.fresh_or_cached_token().await;

            let query = self.query_args(&[]);
            let url = endpoint_url(&self.config.base_url, &["tenants", tenant_id], &query)?;
            let request = TransportRequest::get(url).auth_token(admin_token.as_deref());

            let mut response = self.transport.send(request).await.inspect_err(|err| {
                log_unexpected_status("tenantInfo", err, false, tenant_id);
            })?;

            match response.body.get_mut("tenant").map(Value::take) {
                Some(tenant) if !tenant.is_null() => Ok(tenant),
                _ => Err(IdentityError::malformed("tenantInfo", &response.body)),
            }
        }
        .await;
        observe("tenant_info", result).await
    }

    /// Service catalog received with the admin token. Refreshes it when stale.
    pub async fn service_catalog(&self) -> Result<Vec<CatalogEntry>> {
        let result = self
            .coordinator
            .fresh_state()
            .await
            .map(|state| state.service_catalog);
        observe("service_catalog", result).await
    }

    /// Admin token, its expiry and the tenant id found in the cloud servers catalog entry.
    pub async fn tenant_id_and_token(&self) -> Result<TenantIdAndToken> {
        let result: Result<TenantIdAndToken> = async {
            let state = self.coordinator.fresh_state().await?;
            let tenant_id = cloud_servers_tenant_id(&state.service_catalog)?;
            Ok(TenantIdAndToken { token: state.token, expires: state.expires, tenant_id })
        }
        .await;
        observe("tenant_id_and_token", result).await
    }
}

/// Tenant id of the last `cloudServers`/`cloudServersLegacy` entry's first endpoint.
pub fn cloud_servers_tenant_id(catalog: &[CatalogEntry]) -> Result<Option<String>> {
    let mut tenant_id = None;
    for entry in catalog
        .iter()
        .filter(|entry| CLOUD_SERVERS_ENTRIES.contains(&entry.name.as_str()))
    {
        let endpoint = entry
            .endpoints
            .first()
            .ok_or_else(|| IdentityError::CatalogInvariant { name: entry.name.clone() })?;
        tenant_id = endpoint.tenant_id.clone();
    }
    Ok(tenant_id)
}
