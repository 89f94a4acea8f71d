//! Application settings
//!
//! Precedence, lowest first: built-in defaults, the YAML file, environment
//! variables. Every section derives serde with defaults so a partial file is
//! valid.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::secrets::SecretStore;

use super::env::{overlay, overlay_opt};
use super::error::{ConfigError, ConfigResult};

/// MCP protocol revision sent with every request
pub const DEFAULT_PROTOCOL_VERSION: &str = "2025-03-26";

/// Retry bounds for a single outbound MCP operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay_ms: 2_000,
            max_delay_ms: 8_000,
        }
    }
}

/// Connection to the tool-discovery (MCP) server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct McpSettings {
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Per-call timeout in seconds
    pub timeout_secs: u64,
    pub protocol_version: String,
    pub retry: RetrySettings,
    /// Consecutive failed `connect()` calls before the manager gives up
    pub max_connection_attempts: u32,
    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,
    /// Tool list lifetime; `None` keeps it until invalidated
    pub tool_cache_ttl_secs: Option<u64>,
}

impl Default for McpSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            path: "/mcp".to_string(),
            timeout_secs: 30,
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            retry: RetrySettings::default(),
            max_connection_attempts: 3,
            headers: BTreeMap::new(),
            tool_cache_ttl_secs: None,
        }
    }
}

impl McpSettings {
    /// Server URL, always with a trailing slash
    pub fn url(&self) -> String {
        let path = self.path.trim_matches('/');
        if path.is_empty() {
            format!("http://{}:{}/", self.host, self.port)
        } else {
            format!("http://{}:{}/{}/", self.host, self.port, path)
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn tool_cache_ttl(&self) -> Option<Duration> {
        self.tool_cache_ttl_secs.map(Duration::from_secs)
    }
}

/// Language-model endpoint and sampling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Provider id (`azure`, `openai`, `ollama`, ...)
    pub provider: String,
    /// Endpoint base URL; required for `azure`
    pub endpoint: Option<String>,
    /// Model or deployment name
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Upper bound on model calls per chat turn
    pub max_rounds: u32,
    pub system_prompt: String,
    /// Resolved from the secret store, never read from or written to the file
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "azure".to_string(),
            endpoint: None,
            model: "gpt-4o".to_string(),
            temperature: 0.1,
            max_tokens: 4000,
            max_rounds: 8,
            system_prompt: "You are a helpful assistant for GitHub repositories and local git \
                            workspaces. Use the available tools to answer questions accurately."
                .to_string(),
            api_key: None,
        }
    }
}

impl LlmSettings {
    pub fn requires_api_key(&self) -> bool {
        !matches!(self.provider.to_lowercase().as_str(), "ollama" | "mock")
    }
}

/// Chat HTTP service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Discovery attempts made by the startup warm-up task
    pub warmup_attempts: u32,
    pub warmup_delay_ms: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            warmup_attempts: 5,
            warmup_delay_ms: 2_000,
        }
    }
}

/// Which discovered tools are offered to the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// If non-empty, only these tools
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Complete configuration for the chat service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mcp: McpSettings,
    pub llm: LlmSettings,
    pub server: ServerSettings,
    pub tools: ToolSettings,
}

impl AppConfig {
    /// `~/.config/ghagent/config.yaml` (platform config dir)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ghagent").join("config.yaml"))
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Load defaults, then the file, then the environment
    ///
    /// An explicit `path` must exist; without one the default location is
    /// used only when present.
    pub fn load(path: Option<&Path>, source: &dyn SecretStore) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(source)?;
        Ok(config)
    }

    /// Apply environment overrides and resolve the API key
    pub fn apply_env(&mut self, source: &dyn SecretStore) -> ConfigResult<()> {
        let mcp = &mut self.mcp;
        overlay(source, "MCP_SERVER_HOST", &mut mcp.host)?;
        overlay(source, "MCP_SERVER_PORT", &mut mcp.port)?;
        overlay(source, "MCP_SERVER_PATH", &mut mcp.path)?;
        overlay(source, "HTTP_TIMEOUT_SEC", &mut mcp.timeout_secs)?;
        overlay(source, "MCP_TIMEOUT_SEC", &mut mcp.timeout_secs)?;
        overlay(source, "MCP_PROTOCOL_VERSION", &mut mcp.protocol_version)?;
        overlay(source, "MCP_RETRY_ATTEMPTS", &mut mcp.retry.attempts)?;
        overlay(source, "MCP_RETRY_INITIAL_MS", &mut mcp.retry.initial_delay_ms)?;
        overlay(source, "MCP_RETRY_MAX_MS", &mut mcp.retry.max_delay_ms)?;
        overlay(source, "MCP_MAX_CONNECTION_ATTEMPTS", &mut mcp.max_connection_attempts)?;
        overlay_opt(source, "MCP_TOOL_CACHE_TTL_SEC", &mut mcp.tool_cache_ttl_secs)?;

        let llm = &mut self.llm;
        overlay(source, "LLM_PROVIDER", &mut llm.provider)?;
        overlay_opt(source, "AZURE_OPENAI_ENDPOINT", &mut llm.endpoint)?;
        overlay_opt(source, "LLM_API_BASE", &mut llm.endpoint)?;
        overlay(source, "AZURE_OPENAI_DEPLOYMENT", &mut llm.model)?;
        overlay(source, "LLM_MODEL", &mut llm.model)?;
        overlay(source, "OPENAI_TEMPERATURE", &mut llm.temperature)?;
        overlay(source, "LLM_MAX_TOKENS", &mut llm.max_tokens)?;
        overlay(source, "AGENT_MAX_ROUNDS", &mut llm.max_rounds)?;
        llm.api_key = source
            .get("LLM_API_KEY")
            .or_else(|| source.get(&llm.provider));

        overlay(source, "HOST", &mut self.server.host)?;
        overlay(source, "PORT", &mut self.server.port)?;
        Ok(())
    }

    /// Reject configurations the service cannot start with
    pub fn validate(&self) -> ConfigResult<()> {
        if self.llm.requires_api_key() && self.llm.api_key.is_none() {
            return Err(ConfigError::Missing(format!(
                "API key for provider '{}' (set AZURE_OPENAI_API_KEY or LLM_API_KEY)",
                self.llm.provider
            )));
        }
        if self.llm.provider.eq_ignore_ascii_case("azure") && self.llm.endpoint.is_none() {
            return Err(ConfigError::Missing("AZURE_OPENAI_ENDPOINT".to_string()));
        }
        if self.mcp.path.trim_matches('/').is_empty() {
            return Err(ConfigError::Invalid("MCP server path must not be empty".to_string()));
        }
        if self.mcp.retry.attempts == 0 {
            return Err(ConfigError::Invalid("retry attempts must be at least 1".to_string()));
        }
        if self.mcp.timeout_secs == 0 {
            return Err(ConfigError::Invalid("MCP timeout must be at least 1 second".to_string()));
        }
        if self.mcp.max_connection_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max connection attempts must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::invalid_value(
                "OPENAI_TEMPERATURE",
                self.llm.temperature.to_string(),
                "expected 0.0 - 2.0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;
    use std::io::Write;

    fn azure_env() -> MemorySecretStore {
        MemorySecretStore::from_pairs([
            ("AZURE_OPENAI_ENDPOINT", "https://example.openai.azure.com/"),
            ("azure", "key-123"),
        ])
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.mcp.url(), "http://127.0.0.1:3000/mcp/");
        assert_eq!(config.mcp.retry, RetrySettings::default());
        assert_eq!(config.mcp.max_connection_attempts, 3);
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.llm.max_tokens, 4000);
    }

    #[test]
    fn test_url_normalizes_slashes() {
        let mut mcp = McpSettings::default();
        mcp.path = "mcp/".to_string();
        assert_eq!(mcp.url(), "http://127.0.0.1:3000/mcp/");
        mcp.path = "/".to_string();
        assert_eq!(mcp.url(), "http://127.0.0.1:3000/");
    }

    #[test]
    fn test_env_overrides() {
        let source = azure_env();
        source.store("MCP_SERVER_HOST", "mcp.internal").unwrap();
        source.store("MCP_SERVER_PORT", "4000").unwrap();
        source.store("PORT", "9090").unwrap();
        source.store("MCP_TOOL_CACHE_TTL_SEC", "120").unwrap();

        let mut config = AppConfig::default();
        config.apply_env(&source).unwrap();

        assert_eq!(config.mcp.url(), "http://mcp.internal:4000/mcp/");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.mcp.tool_cache_ttl(), Some(Duration::from_secs(120)));
        assert_eq!(config.llm.api_key.as_deref(), Some("key-123"));
        config.validate().unwrap();
    }

    #[test]
    fn test_invalid_env_value() {
        let source = MemorySecretStore::from_pairs([("MCP_SERVER_PORT", "not-a-port")]);
        let err = AppConfig::default().apply_env(&source).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validate_missing_credentials() {
        let mut config = AppConfig::default();
        config.apply_env(&MemorySecretStore::new()).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));

        let source = MemorySecretStore::from_pairs([("azure", "key")]);
        let mut config = AppConfig::default();
        config.apply_env(&source).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("AZURE_OPENAI_ENDPOINT"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let source = MemorySecretStore::from_pairs([("LLM_PROVIDER", "ollama"), ("MCP_TIMEOUT_SEC", "0")]);
        let mut config = AppConfig::default();
        config.apply_env(&source).unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let source = MemorySecretStore::from_pairs([("LLM_PROVIDER", "ollama")]);
        let mut config = AppConfig::default();
        config.apply_env(&source).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "mcp:\n  port: 3100\n  retry:\n    attempts: 5\nllm:\n  model: gpt-4o-mini\ntools:\n  exclude: [gitPush]"
        )
        .unwrap();

        let source = azure_env();
        source.store("MCP_SERVER_PORT", "3200").unwrap();

        let config = AppConfig::load(Some(file.path()), &source).unwrap();
        assert_eq!(config.mcp.port, 3200);
        assert_eq!(config.mcp.retry.attempts, 5);
        assert_eq!(config.mcp.retry.initial_delay_ms, 2_000);
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.tools.exclude, vec!["gitPush".to_string()]);
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/ghagent.yaml")), &MemorySecretStore::new())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AppConfig::from_yaml_str("  \n").unwrap(), AppConfig::default());
    }
}
