use serde::Deserialize;
use serde_json::Value;

use crate::cache::catalog::CatalogEntry;
use crate::error::{IdentityError, Result};

/// Admin token, its server-reported expiry and the catalog that came with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenState {
    pub token: Option<String>,
    pub expires: Option<String>,
    pub service_catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct Access {
    token: AccessToken,
    #[serde(rename = "serviceCatalog", default)]
    service_catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct AccessToken {
    id: String,
    expires: Option<String>,
}

impl TokenState {
    /// Builds the state from a `POST /tokens` response body.
    pub fn from_access_body(body: &Value) -> Result<Self> {
        let access = body
            .get("access")
            .filter(|access| !access.is_null())
            .ok_or_else(|| IdentityError::malformed("token refresh", body))?;
        let access: Access = serde_json::from_value(access.clone())
            .map_err(|_| IdentityError::malformed("token refresh", body))?;

        Ok(Self {
            token: Some(access.token.id),
            expires: access.token.expires,
            service_catalog: access.service_catalog,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_token_expiry_and_catalog() {
        let body = json!({"access": {
            "token": {"id": "adm1n", "expires": "2030-01-01T00:00:00Z"},
            "serviceCatalog": [{"name": "cloudServers", "type": "compute", "endpoints": [{"tenantId": "42"}]}]
        }});
        let state = TokenState::from_access_body(&body).unwrap();
        assert_eq!(state.token.as_deref(), Some("adm1n"));
        assert_eq!(state.expires.as_deref(), Some("2030-01-01T00:00:00Z"));
        assert_eq!(state.service_catalog.len(), 1);
        assert_eq!(state.service_catalog[0].endpoints[0].tenant_id.as_deref(), Some("42"));
    }

    #[test]
    fn missing_access_or_token_id_is_malformed() {
        for body in [json!({}), json!({"access": null}), json!({"access": {"token": {}}}), json!({"access": {}})] {
            let err = TokenState::from_access_body(&body).unwrap_err();
            assert!(matches!(err, IdentityError::MalformedResponse { .. }), "{body}");
        }
    }
}
