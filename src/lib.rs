//! # SiteMinder Policy Agent Library
//!
//! Authenticated retrieval of SiteMinder policy objects: a session key
//! obtained by Basic-auth login and cached with a TTL, GETs that refresh the
//! key and retry once on 401, and a TTL/LRU cache of object details.
//!
//! Modules:
//! - `cache` — generic bounded TTL/LRU cache and the detail cache on top of it
//! - `credentials` — Vault and environment sources of the login secret
//! - `auth` — session token manager
//! - `fetch` — authenticated GET with refresh-and-retry, policy operations
//! - `agent` — composition root wiring the pieces from config

pub mod agent;
pub mod auth;
pub mod cache;
pub mod config;
pub mod credentials;
pub mod error;
pub mod fetch;
pub mod helpers;
pub mod observability;
pub mod resilience;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::agent::PolicyAgent;
pub use crate::config::types::ServiceConfig;
pub use crate::error::{FetchError, FetchResult};
