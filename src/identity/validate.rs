//! Token validation against the identity service.

use serde_json::Value;

use crate::error::{IdentityError, Result};
use crate::identity::client::{log_unexpected_status, observe, KeystoneClient};
use crate::transport::{endpoint_url, Transport, TransportRequest};

impl<T: Transport> KeystoneClient<T> {
    /// Validate a user token with the token itself, no admin token involved.
    ///
    /// Cheaper than [`KeystoneClient::validate_token_for_tenant`] but the
    /// answer carries no TTL or tenant membership. Returns the raw
    /// `GET /tenants` body.
    pub async fn validate_token(&self, token: &str) -> Result<Value> {
        let result: Result<Value> = async {
            let url = endpoint_url(&self.config.base_url, &["tenants"], &[])?;
            let request = TransportRequest::get(url).json_content().auth_token(Some(token));
            let response = self.transport.send(request).await?;
            Ok(response.body)
        }
        .await;
        observe("validate_token", result).await
    }

    /// Validate a user token for a tenant using the admin token.
    ///
    /// Returns the `access` object; the caller reads expiry and tenant from it.
    pub async fn validate_token_for_tenant(&self, tenant_id: &str, token: &str) -> Result<Value> {
        let result: Result<Value> = async {
            let admin_token = self.coordinator.fresh_or_cached_token().await;

            let query = self.query_args(&[("belongsTo", tenant_id)]);
            let url = endpoint_url(&self.config.base_url, &["tokens", token], &query)?;
            let request = TransportRequest::get(url).auth_token(admin_token.as_deref());

            let mut response = self.transport.send(request).await.inspect_err(|err| {
                log_unexpected_status("validateTokenForTenant", err, true, tenant_id);
            })?;

            match response.body.get_mut("access").map(Value::take) {
                Some(access) if !access.is_null() => Ok(access),
                _ => Err(IdentityError::malformed("validateTokenForTenant", &response.body)),
            }
        }
        .await;
        observe("validate_token_for_tenant", result).await
    }
}
