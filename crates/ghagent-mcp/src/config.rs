//! Server settings read from the environment

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ghagent_core::config::env::overlay;
use ghagent_core::config::{ConfigError, ConfigResult};
use ghagent_core::secrets::{ChainSecretStore, MemorySecretStore, SecretStore};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub token: String,
    pub api_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl GitHubSettings {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            user_agent: format!("ghagent-mcp/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// `GITHUB_TOKEN` (or `GH_TOKEN`) is required
    pub fn from_store(source: &dyn SecretStore) -> ConfigResult<Self> {
        let token = source.get("github").ok_or_else(|| {
            ConfigError::Missing(
                "GITHUB_TOKEN (create one at https://github.com/settings/tokens)".to_string(),
            )
        })?;

        let mut settings = Self::new(token);
        overlay(source, "GITHUB_API_URL", &mut settings.api_url)?;
        overlay(source, "HTTP_TIMEOUT_SEC", &mut settings.timeout_secs)?;
        Ok(settings)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Listen address and endpoint path for the Streamable HTTP transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenSettings {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            path: "/mcp".to_string(),
        }
    }
}

impl ListenSettings {
    /// Defaults overlaid with `MCP_SERVER_HOST`, `MCP_SERVER_PORT`, `MCP_SERVER_PATH`
    pub fn from_store(source: &dyn SecretStore) -> ConfigResult<Self> {
        let mut settings = Self::default();
        overlay(source, "MCP_SERVER_HOST", &mut settings.host)?;
        overlay(source, "MCP_SERVER_PORT", &mut settings.port)?;
        overlay(source, "MCP_SERVER_PATH", &mut settings.path)?;
        Ok(settings)
    }

    /// `/mcp/` and `mcp` both become `/mcp`; the root path becomes empty
    pub fn normalized_path(&self) -> String {
        let trimmed = self.path.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }
}

/// Working directory for the local git tools
pub fn git_workdir(source: &dyn SecretStore, explicit: Option<PathBuf>) -> PathBuf {
    explicit
        .or_else(|| source.get("GIT_WORKDIR").map(PathBuf::from))
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Command-line values in front of `base`
///
/// Keys whose value is `None` fall through to `base`.
pub fn layered_source<'a>(
    base: Arc<dyn SecretStore>,
    overrides: impl IntoIterator<Item = (&'a str, Option<String>)>,
) -> ChainSecretStore {
    let flags = MemorySecretStore::from_pairs(
        overrides
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v))),
    );
    ChainSecretStore::new(vec![Arc::new(flags) as Arc<dyn SecretStore>]).with(base)
}
