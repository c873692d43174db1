//! Shared constants and invariants

use std::time::Duration;

/// A refreshed admin token (or a failed refresh) is trusted for this long.
pub const TRUST_TOKEN_FOR: Duration = Duration::from_secs(60);
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_CONFIG_PATH: &str = "keystone-agent.yaml";

/// Statuses the identity service answers with on success.
pub const KEYSTONE_SUCCESS_STATUS_CODES: [u16; 2] = [200, 203];

// lowercase, used as a static header name
pub const AUTH_TOKEN_HEADER: &str = "x-auth-token";

/// Catalog entries whose first endpoint carries the admin tenant id.
pub const CLOUD_SERVERS_ENTRIES: [&str; 2] = ["cloudServers", "cloudServersLegacy"];
