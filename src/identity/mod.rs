//! Identity operations built on the cached admin token.

pub mod client;
pub mod tenant;
pub mod validate;

pub use client::KeystoneClient;
pub use tenant::{cloud_servers_tenant_id, TenantIdAndToken};
