//! Layered lookup across several stores

use std::sync::Arc;

use super::traits::{SecretInfo, SecretStore, SecretStoreError, SecretStoreResult};

/// Tries each store in order; the first answer wins
///
/// Writes go to the first store. An empty chain answers nothing and rejects
/// writes as read-only.
pub struct ChainSecretStore {
    stores: Vec<Arc<dyn SecretStore>>,
}

impl ChainSecretStore {
    pub fn new(stores: Vec<Arc<dyn SecretStore>>) -> Self {
        Self { stores }
    }

    /// Append a lower-priority store
    pub fn with(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.stores.push(store);
        self
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl SecretStore for ChainSecretStore {
    fn name(&self) -> &str {
        "chain"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.stores.iter().find_map(|s| s.get(key))
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        match self.stores.first() {
            Some(store) => store.store(key, value),
            None => Err(SecretStoreError::ReadOnly),
        }
    }

    fn get_info(&self, key: &str) -> SecretInfo {
        self.stores
            .iter()
            .find(|s| s.has(key))
            .map(|s| SecretInfo::found(s.name()))
            .unwrap_or_else(SecretInfo::not_found)
    }
}

impl std::fmt::Debug for ChainSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.stores.iter().map(|s| s.name()).collect();
        f.debug_struct("ChainSecretStore").field("stores", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;

    #[test]
    fn test_chain_priority_and_fallback() {
        let overrides = Arc::new(MemorySecretStore::from_pairs([("PORT", "9000")]));
        let base = Arc::new(MemorySecretStore::from_pairs([("PORT", "8081"), ("HOST", "0.0.0.0")]));

        let chain = ChainSecretStore::new(vec![overrides.clone()]).with(base);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.get("PORT").as_deref(), Some("9000"));
        assert_eq!(chain.get("HOST").as_deref(), Some("0.0.0.0"));
        assert_eq!(chain.get_info("HOST").source, "memory");
        assert!(!chain.get_info("MISSING").available);

        chain.store("NEW", "v").unwrap();
        assert_eq!(overrides.get("NEW").as_deref(), Some("v"));
    }

    #[test]
    fn test_empty_chain() {
        let chain = ChainSecretStore::new(Vec::new());
        assert!(chain.is_empty());
        assert_eq!(chain.get("anything"), None);
        assert!(matches!(chain.store("k", "v"), Err(SecretStoreError::ReadOnly)));
    }
}
