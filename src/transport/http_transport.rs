use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::trace;

use crate::error::{IdentityError, Result};
use crate::transport::{Transport, TransportRequest, TransportResponse};
use crate::utils::constants::KEYSTONE_SUCCESS_STATUS_CODES;

/// [`Transport`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        trace!("{} {}", request.method, request.url.path());
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.body(serde_json::to_vec(body).map_err(|e| IdentityError::transport(e.to_string()))?);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let parsed = parse_body(&text);

        if !KEYSTONE_SUCCESS_STATUS_CODES.contains(&status.as_u16()) {
            return Err(IdentityError::UnexpectedStatus { status: status.as_u16(), body: parsed.ok().flatten() });
        }

        let body = parsed
            .map_err(|e| IdentityError::transport(format!("invalid JSON body from identity service: {}", e)))?
            .unwrap_or(Value::Null);
        Ok(TransportResponse { status, body })
    }
}

fn parse_body(text: &str) -> std::result::Result<Option<Value>, serde_json::Error> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text).map(Some)
}
