//! Configuration loading
//!
//! `AppConfig` is assembled from defaults, an optional YAML file
//! (`~/.config/ghagent/config.yaml` unless `--config` is given) and
//! environment variables read through a [`SecretStore`](crate::secrets::SecretStore).

mod error;
mod settings;
pub mod env;

pub use error::{ConfigError, ConfigResult};
pub use settings::{
    AppConfig, LlmSettings, McpSettings, RetrySettings, ServerSettings, ToolSettings,
    DEFAULT_PROTOCOL_VERSION,
};
