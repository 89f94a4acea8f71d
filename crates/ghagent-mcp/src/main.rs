use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rmcp::transport::stdio;
use rmcp::ServiceExt;

use ghagent_core::{EnvSecretStore, SecretStore};
use ghagent_mcp::{
    git_workdir, http_router, layered_source, GitHubClient, GitHubMcp, GitHubSettings, GitRunner,
    ListenSettings,
};

#[derive(Parser, Debug)]
#[command(name = "ghagent-mcp", version, about = "MCP server exposing GitHub and local git tools")]
struct Args {
    /// Listen host (overrides MCP_SERVER_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides MCP_SERVER_PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Endpoint path (overrides MCP_SERVER_PATH)
    #[arg(long)]
    path: Option<String>,

    /// Serve over stdin/stdout instead of HTTP
    #[arg(long)]
    stdio: bool,

    /// Working copy for the git tools (overrides GIT_WORKDIR)
    #[arg(long)]
    workdir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout belongs to the protocol in stdio mode
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();
    let env = EnvSecretStore::new();

    let settings = GitHubSettings::from_store(&env).context("GitHub token is required")?;
    let github = GitHubClient::new(&settings).context("failed to create GitHub client")?;
    let workdir = git_workdir(&env, args.workdir);
    let server = GitHubMcp::new(github, GitRunner::new(workdir.clone()));

    tracing::info!(
        api_url = %settings.api_url,
        workdir = %workdir.display(),
        tools = server.tool_names().len(),
        "starting GitHub MCP server"
    );

    if args.stdio {
        let running = server.serve(stdio()).await.context("failed to start stdio transport")?;
        running.waiting().await?;
        return Ok(());
    }

    let source = layered_source(
        Arc::new(env) as Arc<dyn SecretStore>,
        [
            ("MCP_SERVER_HOST", args.host),
            ("MCP_SERVER_PORT", args.port.map(|p| p.to_string())),
            ("MCP_SERVER_PATH", args.path),
        ],
    );
    let listen = ListenSettings::from_store(&source).context("invalid listen settings")?;

    let addr: SocketAddr = format!("{}:{}", listen.host, listen.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", listen.host, listen.port))?;
    let path = listen.normalized_path();
    let app = http_router(server, &path);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{}{}", listener.local_addr()?, path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("GitHub MCP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
}
