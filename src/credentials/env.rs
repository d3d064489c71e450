use std::env;

use crate::credentials::CredentialProvider;

/// Reads the secret from a process environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    pub var: String,
}

impl EnvCredentials {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    pub fn read(&self) -> Option<String> {
        env::var(&self.var).ok().filter(|value| !value.is_empty())
    }
}

impl CredentialProvider for EnvCredentials {
    async fn get_secret(&self) -> Option<String> {
        self.read()
    }
}
