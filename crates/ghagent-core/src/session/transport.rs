//! Transport seam between the session manager and the MCP server
//!
//! [`McpConnector`] opens sessions; [`McpSession`] is one live session. The
//! production pair speaks Streamable HTTP through `rmcp`; tests substitute
//! scripted implementations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rmcp::{
    model::{
        CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation,
        ProtocolVersion, RawContent,
    },
    service::{Peer, RunningService},
    transport::{
        streamable_http_client::StreamableHttpClientTransportConfig, StreamableHttpClientTransport,
    },
    RoleClient, ServiceExt,
};
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::logging::Logger;
use crate::types::ToolDescriptor;

use super::error::{SessionError, SessionResult};
use super::headers::SessionHeaders;

/// One live MCP session
#[async_trait]
pub trait McpSession: Send + Sync {
    /// `tools/list`, following pagination
    async fn list_tools(&self) -> SessionResult<Vec<ToolDescriptor>>;

    /// `tools/call`; a tool-reported failure surfaces as [`SessionError::Tool`]
    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> SessionResult<Value>;

    /// Name announced by the server during the handshake
    fn server_name(&self) -> Option<String> {
        None
    }

    /// Close the session; must be safe to call more than once
    async fn close(&self);
}

/// Opens sessions against an MCP endpoint
#[async_trait]
pub trait McpConnector: Send + Sync {
    async fn connect(
        &self,
        url: &str,
        headers: &SessionHeaders,
        timeout: Duration,
    ) -> SessionResult<Arc<dyn McpSession>>;
}

/// Streamable HTTP connector backed by `rmcp` and `reqwest`
pub struct StreamableHttpConnector {
    logger: Arc<dyn Logger>,
}

impl StreamableHttpConnector {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self { logger }
    }

    fn client_info() -> ClientInfo {
        ClientInfo {
            meta: None,
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: "ghagent".to_string(),
                title: Some("GitHub chat agent".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                website_url: None,
                icons: None,
            },
        }
    }
}

#[async_trait]
impl McpConnector for StreamableHttpConnector {
    async fn connect(
        &self,
        url: &str,
        headers: &SessionHeaders,
        timeout: Duration,
    ) -> SessionResult<Arc<dyn McpSession>> {
        self.logger.info(&format!(
            "[McpConnector] Connecting to {} (request id {})",
            url,
            headers.request_id().unwrap_or("-")
        ));

        let http_client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .default_headers(headers.to_header_map()?)
            .build()
            .map_err(|e| SessionError::connection(&e))?;

        let transport = StreamableHttpClientTransport::with_client(
            http_client,
            StreamableHttpClientTransportConfig::with_uri(url.to_string()),
        );

        let service = tokio::time::timeout(timeout, Self::client_info().serve(transport))
            .await
            .map_err(|_| SessionError::Timeout(timeout))?
            .map_err(|e| SessionError::connection(&e))?;

        let session = RmcpSession::new(service, timeout, Arc::clone(&self.logger));
        self.logger.info(&format!(
            "[McpConnector] Connected to {}",
            session.server_name().unwrap_or_else(|| url.to_string())
        ));
        Ok(Arc::new(session))
    }
}

/// A running `rmcp` client session
pub struct RmcpSession {
    peer: Peer<RoleClient>,
    service: Mutex<Option<RunningService<RoleClient, ClientInfo>>>,
    timeout: Duration,
    logger: Arc<dyn Logger>,
}

impl RmcpSession {
    fn new(service: RunningService<RoleClient, ClientInfo>, timeout: Duration, logger: Arc<dyn Logger>) -> Self {
        Self {
            peer: service.peer().clone(),
            service: Mutex::new(Some(service)),
            timeout,
            logger,
        }
    }

    async fn with_timeout<T, F>(&self, fut: F) -> SessionResult<T>
    where
        F: std::future::Future<Output = Result<T, rmcp::ServiceError>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| SessionError::Timeout(self.timeout))?
            .map_err(SessionError::from)
    }
}

#[async_trait]
impl McpSession for RmcpSession {
    async fn list_tools(&self) -> SessionResult<Vec<ToolDescriptor>> {
        let tools = self.with_timeout(self.peer.list_all_tools()).await?;
        self.logger
            .debug(&format!("[McpSession] tools/list returned {} tools", tools.len()));
        Ok(tools.into_iter().map(ToolDescriptor::from).collect())
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> SessionResult<Value> {
        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: Some(arguments),
            task: None,
        };
        let result = self.with_timeout(self.peer.call_tool(params)).await?;
        payload_from_result(name, result)
    }

    fn server_name(&self) -> Option<String> {
        self.peer
            .peer_info()
            .map(|info| info.server_info.name.clone())
    }

    async fn close(&self) {
        let service = self.service.lock().await.take();
        if let Some(service) = service {
            if let Err(e) = service.cancel().await {
                self.logger
                    .warn(&format!("[McpSession] Error while closing session: {}", e));
            }
        }
    }
}

/// Turn a `tools/call` result into a JSON payload
///
/// Structured content wins; otherwise text blocks are joined and parsed as
/// JSON when possible.
pub fn payload_from_result(name: &str, result: CallToolResult) -> SessionResult<Value> {
    let text = result
        .content
        .iter()
        .filter_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n");

    if result.is_error.unwrap_or(false) {
        return Err(SessionError::Tool {
            name: name.to_string(),
            message: if text.is_empty() {
                "tool reported an error".to_string()
            } else {
                text
            },
        });
    }

    if let Some(structured) = result.structured_content {
        return Ok(structured);
    }
    if text.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}
