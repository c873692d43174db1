//! Transport module
//!
//! One HTTP exchange with the identity service: request in, status and parsed JSON body out.
//! The coordinator and the identity operations only talk to the service through [`Transport`].
use std::future::Future;

use http::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, Method, StatusCode};
use reqwest::Url;
use serde_json::Value;

use crate::error::{IdentityError, Result};
use crate::utils::constants::AUTH_TOKEN_HEADER;

pub mod http_transport;

pub use http_transport::HttpTransport;

#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl TransportRequest {
    /// GET with `Accept: application/json`.
    pub fn get(url: Url) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        Self { method: Method::GET, url, headers, body: None }
    }

    /// POST of a JSON body with `Accept` and `Content-Type` set to `application/json`.
    pub fn post_json(url: Url, body: Value) -> Self {
        let mut request = Self::get(url).json_content();
        request.method = Method::POST;
        request.body = Some(body);
        request
    }

    pub fn json_content(mut self) -> Self {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Sets `X-Auth-Token`. A token that is not a valid header value is skipped
    /// and the service answers 401 as if none was sent.
    pub fn auth_token(mut self, token: Option<&str>) -> Self {
        if let Some(value) = token.and_then(|t| HeaderValue::from_str(t).ok()) {
            self.headers.insert(AUTH_TOKEN_HEADER, value);
        }
        self
    }
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// `{base}/{segments...}?{query}` with every segment percent-encoded.
pub fn endpoint_url(base: &Url, segments: &[&str], query: &[(&str, &str)]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| IdentityError::transport(format!("identity url '{}' cannot be a base", base)))?
        .pop_if_empty()
        .extend(segments);
    url.set_query(None);
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

pub trait Transport: Send + Sync + 'static {
    /// Performs the request. Statuses other than 200/203 come back as
    /// [`crate::error::IdentityError::UnexpectedStatus`].
    fn send(&self, request: TransportRequest) -> impl Future<Output = Result<TransportResponse>> + Send;
}
