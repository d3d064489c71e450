//! Shared constants and invariants

// SiteMinder REST paths, relative to the configured base url
pub const LOGIN_PATH: &str = "/ca/api/sso/services/login/v1/token";
pub const POLICY_PATH: &str = "/ca/api/sso/services/policy/v1";

// Fixed per-call timeouts
pub const LOGIN_TIMEOUT_SECS: u64 = 15;
pub const GET_TIMEOUT_SECS: u64 = 30;

/// Reserved slot of the session key inside the token cache
pub const TOKEN_CACHE_KEY: &str = "bearer_token";
pub const TOKEN_CACHE_NAME: &str = "token";

pub const DEFAULT_MAX_RETRIES: u32 = 1;

pub const DEFAULT_TOKEN_CACHE_CAPACITY: usize = 1;
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 900;
pub const DEFAULT_DETAIL_CACHE_CAPACITY: usize = 100;
pub const DEFAULT_DETAIL_CACHE_TTL_SECS: u64 = 300;

pub const DEFAULT_PASSWORD_ENV_VAR: &str = "SITE_MINDER_PASSWORD";
pub const DEFAULT_VAULT_MOUNT: &str = "secret";
pub const DEFAULT_VAULT_FIELD: &str = "password";
