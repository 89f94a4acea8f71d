use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tower_http::cors::CorsLayer;

use ghagent_core::config::AppConfig;
use ghagent_core::{EnvSecretStore, Logger, TracingLogger};
use ghagent_server::{build_state, router, spawn_warmup, WarmupPolicy};

#[derive(Parser, Debug)]
#[command(name = "ghagent-server", version, about = "Chat service backed by GitHub MCP tools")]
struct Args {
    /// YAML configuration file (defaults to ~/.config/ghagent/config.yaml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen port (overrides PORT and the config file)
    #[arg(long)]
    port: Option<u16>,

    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref(), &EnvSecretStore::new())
        .context("failed to load configuration")?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    config.validate().context("invalid configuration")?;

    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());
    let state = build_state(&config, logger).context("failed to create LLM provider")?;

    tracing::info!(
        mcp_url = %config.mcp.url(),
        provider = %config.llm.provider,
        model = %config.llm.model,
        "starting chat service"
    );
    spawn_warmup(state.clone(), WarmupPolicy::from(&config.server));

    let app = router(state.clone()).layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.server.host, config.server.port))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.manager().disconnect().await;
    tracing::info!("chat service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
