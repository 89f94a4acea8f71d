//! Credential and setting lookup
//!
//! - `SecretStore` trait for custom stores
//! - `EnvSecretStore` over the process environment (with provider aliases)
//! - `MemorySecretStore` for tests
//! - `ChainSecretStore` to layer stores by priority

mod traits;
mod env_store;
mod memory_store;
mod chain_store;

pub use traits::{SecretStore, SecretInfo, SecretStoreError, SecretStoreResult};
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
pub use chain_store::ChainSecretStore;
