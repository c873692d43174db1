//! Configuration validation with aggregated errors.
//! - identity url must parse and use http/https
//! - credentials must be complete for the selected mode
//! - settings: timeout, server address, metrics path, log level

use reqwest::Url;
use tracing::{error, info};

use crate::config::identity::{CredentialsConfig, IdentityConfig, ServiceConfig};
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::get_metrics;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_identity(&cfg.identity, &mut errors);
    validate_settings(&cfg.settings, &mut errors);

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_validation_errors.inc();
        Err(errors)
    }
}

/// IDENTITY VALIDATION
fn validate_identity(identity: &IdentityConfig, errors: &mut Vec<String>) {
    match Url::parse(&identity.url) {
        Ok(url) => {
            if url.scheme() != "http" && url.scheme() != "https" {
                errors.push(format!("identity.url '{}' must use http or https", identity.url));
            }
        }
        Err(e) => errors.push(format!("identity.url '{}' is not a valid url: {}", identity.url, e)),
    }

    match &identity.credentials {
        CredentialsConfig::Password { username, password } => {
            require_non_empty("identity.credentials.username", username, errors);
            require_non_empty("identity.credentials.password", password, errors);
        }
        CredentialsConfig::ApiKey { username, apikey } => {
            require_non_empty("identity.credentials.username", username, errors);
            require_non_empty("identity.credentials.apikey", apikey, errors);
        }
    }

    for key in identity.extra_args.keys() {
        if key.trim().is_empty() {
            errors.push("identity.extra_args contains an empty key".to_string());
        }
        if key == "belongsTo" {
            errors.push("identity.extra_args must not define 'belongsTo'".to_string());
        }
    }
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    if settings.timeout_ms == Some(0) {
        errors.push("settings.timeout_ms must be greater than 0".to_string());
    }

    if settings.server.host.is_empty() {
        errors.push("settings.server.host must not be empty".to_string());
    }
    if settings.server.port.parse::<u16>().is_err() {
        errors.push(format!("settings.server.port '{}' must be a valid port", settings.server.port));
    }

    if !settings.metrics.path.starts_with('/') {
        errors.push(format!("settings.metrics.path '{}' must start with '/'", settings.metrics.path));
    }

    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' must be one of {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn require_non_empty(field: &str, value: &str, errors: &mut Vec<String>) {
    if value.trim().is_empty() {
        errors.push(format!("{} must not be empty", field));
    }
}
