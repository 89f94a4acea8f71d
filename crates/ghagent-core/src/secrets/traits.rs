//! Secret and setting lookup

use thiserror::Error;

/// Where a value was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretInfo {
    pub available: bool,
    /// Name of the store that answered (`"none"` when missing)
    pub source: String,
}

impl SecretInfo {
    pub fn found(source: impl Into<String>) -> Self {
        Self {
            available: true,
            source: source.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            available: false,
            source: "none".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Store is read-only")]
    ReadOnly,

    #[error("Secret not found: {0}")]
    NotFound(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Key/value lookup for credentials and environment-style settings
///
/// Configuration loading reads every environment key through this trait, so
/// tests can swap the process environment for a [`MemorySecretStore`](super::MemorySecretStore).
///
/// Keys are either literal variable names (`MCP_SERVER_PORT`) or provider
/// aliases (`azure`, `github`) that a store may map to several variables.
pub trait SecretStore: Send + Sync {
    fn name(&self) -> &str;

    fn get(&self, key: &str) -> Option<String>;

    /// Store a value; read-only stores return [`SecretStoreError::ReadOnly`]
    fn store(&self, _key: &str, _value: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Look a value up, failing with `NotFound` when absent
    fn require(&self, key: &str) -> SecretStoreResult<String> {
        self.get(key)
            .ok_or_else(|| SecretStoreError::NotFound(key.to_string()))
    }

    fn get_info(&self, key: &str) -> SecretInfo {
        if self.has(key) {
            SecretInfo::found(self.name())
        } else {
            SecretInfo::not_found()
        }
    }
}
