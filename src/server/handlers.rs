use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::cache::catalog::CatalogEntry;
use crate::error::IdentityError;
use crate::identity::TenantIdAndToken;
use crate::server::server::AppState;
use crate::transport::Transport;

/// Maps identity errors onto the local HTTP surface.
#[derive(Debug)]
pub struct ApiError(pub IdentityError);

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            IdentityError::UnexpectedStatus { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            IdentityError::Transport { timeout: true, .. } => StatusCode::GATEWAY_TIMEOUT,
            IdentityError::Transport { .. }
            | IdentityError::MalformedResponse { .. }
            | IdentityError::CatalogInvariant { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": self.0.reason(),
            "message": self.0.to_string(),
            "upstream": self.0.body(),
        });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ValidateQuery {
    #[serde(rename = "belongsTo")]
    pub belongs_to: Option<String>,
}

pub async fn admin_token<T: Transport>(
    State(state): State<AppState<T>>,
) -> Result<Json<TenantIdAndToken>, ApiError> {
    Ok(Json(state.client.tenant_id_and_token().await?))
}

pub async fn service_catalog<T: Transport>(
    State(state): State<AppState<T>>,
) -> Result<Json<Vec<CatalogEntry>>, ApiError> {
    Ok(Json(state.client.service_catalog().await?))
}

pub async fn tenant_info<T: Transport>(
    State(state): State<AppState<T>>,
    Path(tenant_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(state.client.tenant_info(&tenant_id).await?))
}

/// With `belongsTo` the token is checked against that tenant using the admin
/// token, without it the token validates itself.
pub async fn validate_token<T: Transport>(
    State(state): State<AppState<T>>,
    Path(token): Path<String>,
    Query(query): Query<ValidateQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = match query.belongs_to.as_deref() {
        Some(tenant_id) => state.client.validate_token_for_tenant(tenant_id, &token).await?,
        None => {
            debug!("validating token without tenant");
            state.client.validate_token(&token).await?
        }
    };
    Ok(Json(body))
}
