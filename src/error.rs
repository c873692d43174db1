//! Error type shared by the transport, the token coordinator and the identity operations.
//!
//! `IdentityError` is `Clone` because one refresh outcome is handed to every
//! waiter of that refresh.

use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IdentityError>;

#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    /// The identity service answered with a status other than 200/203.
    #[error("identity service returned unexpected status code {status}")]
    UnexpectedStatus { status: u16, body: Option<Value> },

    /// Connection, timeout or body decoding failure.
    #[error("identity request failed: {message}")]
    Transport { message: String, timeout: bool },

    /// A successful response is missing a field the operation requires.
    #[error("{context}: malformed response: {body}")]
    MalformedResponse { context: &'static str, body: Value },

    /// A matched service catalog entry carries no endpoints.
    #[error("service catalog entry '{name}' has no endpoints")]
    CatalogInvariant { name: String },
}

impl IdentityError {
    pub fn transport(message: impl Into<String>) -> Self {
        IdentityError::Transport { message: message.into(), timeout: false }
    }

    pub fn malformed(context: &'static str, body: &Value) -> Self {
        IdentityError::MalformedResponse { context, body: body.clone() }
    }

    /// Status code of an unexpected-status error.
    pub fn status(&self) -> Option<u16> {
        match self {
            IdentityError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body of an unexpected-status error, when the service sent one.
    pub fn body(&self) -> Option<&Value> {
        match self {
            IdentityError::UnexpectedStatus { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            IdentityError::UnexpectedStatus { .. } => "status",
            IdentityError::Transport { timeout: true, .. } => "timeout",
            IdentityError::Transport { .. } => "transport",
            IdentityError::MalformedResponse { .. } => "malformed",
            IdentityError::CatalogInvariant { .. } => "catalog",
        }
    }
}

impl From<reqwest::Error> for IdentityError {
    fn from(err: reqwest::Error) -> Self {
        IdentityError::Transport { timeout: err.is_timeout(), message: err.to_string() }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_and_body_only_for_unexpected_status() {
        let err = IdentityError::UnexpectedStatus { status: 404, body: Some(json!({"itemNotFound": {}})) };
        assert_eq!(err.status(), Some(404));
        assert!(err.body().is_some());
        assert_eq!(err.reason(), "status");

        let err = IdentityError::malformed("tenantInfo", &json!({}));
        assert_eq!(err.status(), None);
        assert!(err.body().is_none());
        assert_eq!(err.to_string(), "tenantInfo: malformed response: {}");
    }
}
