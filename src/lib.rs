//! # Keystone Agent Library
//!
//! Caches an identity service (Keystone v2) admin token, refreshes it with a
//! single request no matter how many callers need it at once, and builds
//! token validation, tenant and service catalog lookups on top of it.
//!
//! Modules:
//! - `cache` — admin token state, service catalog and the refresh coordinator
//! - `identity` — `KeystoneClient` and its operations
//! - `transport` — one HTTP exchange with the identity service
//! - `config` — YAML configuration, validation and `ClientConfig`
//! - `server` — local HTTP surface for the operations

pub mod cache;
pub mod config;
pub mod error;
pub mod helpers;
pub mod identity;
pub mod observability;
pub mod server;
pub mod transport;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::config::identity::{ClientConfig, Credentials, ServiceConfig};
pub use crate::error::{IdentityError, Result};
pub use crate::identity::{KeystoneClient, TenantIdAndToken};
