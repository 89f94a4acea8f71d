//! Process environment store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::SecretStore;

/// Provider alias → environment variables, tried in order
static PROVIDER_VARS: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("azure", vec!["AZURE_OPENAI_API_KEY", "AZURE_API_KEY"]);
    m.insert("openai", vec!["OPENAI_API_KEY"]);
    m.insert("anthropic", vec!["ANTHROPIC_API_KEY"]);
    m.insert("gemini", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("openrouter", vec!["OPENROUTER_API_KEY"]);
    m.insert("github", vec!["GITHUB_TOKEN", "GH_TOKEN"]);
    m.insert("ollama", vec![]);
    m
});

/// Read-only store over `std::env`
///
/// Empty variables are treated as unset.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    /// Environment variables consulted for a provider alias
    pub fn vars_for_provider(provider: &str) -> Option<&'static [&'static str]> {
        PROVIDER_VARS
            .get(provider.to_lowercase().as_str())
            .map(|v| v.as_slice())
    }

    fn non_empty(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        if let Some(value) = Self::non_empty(key) {
            return Some(value);
        }
        Self::vars_for_provider(key)?
            .iter()
            .find_map(|var| Self::non_empty(var))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::SecretStoreError;

    #[test]
    fn test_env_store_read_only() {
        let store = EnvSecretStore::new();
        assert!(matches!(store.store("k", "v"), Err(SecretStoreError::ReadOnly)));
    }

    #[test]
    fn test_env_store_direct_and_alias() {
        env::set_var("GHAGENT_TEST_DIRECT_VAR", "direct");
        env::set_var("GH_TOKEN", "gh-test-token");
        env::remove_var("GITHUB_TOKEN");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("GHAGENT_TEST_DIRECT_VAR").as_deref(), Some("direct"));
        assert_eq!(store.get("GitHub").as_deref(), Some("gh-test-token"));
        assert_eq!(store.get_info("GHAGENT_TEST_DIRECT_VAR").source, "env");

        env::remove_var("GHAGENT_TEST_DIRECT_VAR");
        env::remove_var("GH_TOKEN");
    }

    #[test]
    fn test_env_store_empty_is_unset() {
        env::set_var("GHAGENT_TEST_EMPTY_VAR", "");
        let store = EnvSecretStore::new();
        assert_eq!(store.get("GHAGENT_TEST_EMPTY_VAR"), None);
        assert!(!store.get_info("GHAGENT_TEST_EMPTY_VAR").available);
        env::remove_var("GHAGENT_TEST_EMPTY_VAR");
    }

    #[test]
    fn test_vars_for_provider() {
        assert_eq!(
            EnvSecretStore::vars_for_provider("AZURE"),
            Some(&["AZURE_OPENAI_API_KEY", "AZURE_API_KEY"][..])
        );
        assert!(EnvSecretStore::vars_for_provider("unknown").is_none());
    }
}
