use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::config::settings::SettingsConfig;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub identity: IdentityConfig,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// ================================
/// Identity service
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct IdentityConfig {
    /// base url, e.g. https://identity.api.rackspacecloud.com/v2.0
    pub url: String,
    pub credentials: CredentialsConfig,
    /// static query parameters added to every admin-token request
    #[serde(default)]
    pub extra_args: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsConfig {
    Password { username: String, password: String },
    ApiKey { username: String, apikey: String },
}

/// Credentials used to obtain the admin token.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Password { username: String, password: String },
    ApiKey { username: String, api_key: String },
}

impl Credentials {
    pub fn username(&self) -> &str {
        match self {
            Credentials::Password { username, .. } | Credentials::ApiKey { username, .. } => username,
        }
    }

    /// Body of `POST {base}/tokens`.
    pub fn auth_payload(&self) -> Value {
        match self {
            Credentials::Password { username, password } => json!({
                "auth": {"passwordCredentials": {"username": username, "password": password}}
            }),
            Credentials::ApiKey { username, api_key } => json!({
                "auth": {"RAX-KSKEY:apiKeyCredentials": {"username": username, "apiKey": api_key}}
            }),
        }
    }
}

// secrets stay out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"***")
                .finish(),
            Credentials::ApiKey { username, .. } => f
                .debug_struct("ApiKey")
                .field("username", username)
                .field("api_key", &"***")
                .finish(),
        }
    }
}

impl From<&CredentialsConfig> for Credentials {
    fn from(cfg: &CredentialsConfig) -> Self {
        match cfg {
            CredentialsConfig::Password { username, password } => Credentials::Password {
                username: username.to_owned(),
                password: password.to_owned(),
            },
            CredentialsConfig::ApiKey { username, apikey } => Credentials::ApiKey {
                username: username.to_owned(),
                api_key: apikey.to_owned(),
            },
        }
    }
}

/// Immutable client configuration built from a validated [`ServiceConfig`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub credentials: Credentials,
    pub extra_args: Vec<(String, String)>,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| anyhow!("invalid identity url '{}': {}", base_url, e))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("identity url '{}' cannot be used as a base url", base_url));
        }
        Ok(Self {
            base_url,
            credentials,
            extra_args: Vec::new(),
            timeout: Duration::from_millis(crate::utils::constants::DEFAULT_HTTP_TIMEOUT_MS),
        })
    }

    pub fn with_extra_args<I, K, V>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.extra_args = args.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl TryFrom<&ServiceConfig> for ClientConfig {
    type Error = anyhow::Error;

    fn try_from(cfg: &ServiceConfig) -> Result<Self> {
        let identity = &cfg.identity;
        Ok(ClientConfig::new(&identity.url, Credentials::from(&identity.credentials))?
            .with_extra_args(identity.extra_args.clone())
            .with_timeout(Duration::from_millis(cfg.settings.timeout_ms())))
    }
}
