//! HTTP handlers

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use ghagent_core::{HealthStatus, WorkflowError};

use crate::error::{ApiError, ApiResult};
use crate::state::{AppState, AppStatus};
use crate::types::{ChatRequest, ChatResponse, HealthResponse, Trace};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/chat", post(chat))
        .route("/health", get(health))
        .route("/workflow/info", get(workflow_info))
        .with_state(state)
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    if request.query.trim().is_empty() {
        return Err(ApiError::Validation("query must not be empty".to_string()));
    }

    state
        .ensure_tools()
        .await
        .map_err(|reason| ApiError::Unavailable(format!("MCP connect/load failed: {}", reason)))?;

    let preview: String = request.query.chars().take(100).collect();
    state.logger().info(&format!("[Chat] query: {}", preview));

    match state
        .workflow()
        .invoke(&request.query, request.thread_id.as_deref())
        .await
    {
        Ok(turn) => {
            state.logger().info(&format!(
                "[Chat] done: {} tool(s) used in {} round(s)",
                turn.outcome.used_tools.len(),
                turn.model_rounds
            ));
            let trace = Trace {
                tool_names: turn.outcome.tool_names(),
                model_rounds: turn.model_rounds,
                thread_id: Some(turn.thread_id),
                error: turn.outcome.error.clone(),
            };
            let status = if turn.outcome.is_success() { "success" } else { "error" };
            Ok(Json(ChatResponse {
                response: turn.outcome.response,
                used_tools: turn.outcome.used_tools,
                status: status.to_string(),
                trace,
            }))
        }
        Err(WorkflowError::EmptyQuery) => {
            Err(ApiError::Validation("query must not be empty".to_string()))
        }
        Err(err) if err.is_connectivity() => {
            state.set_status(AppStatus::ConnectError(err.to_string()));
            Err(ApiError::Unavailable(err.to_string()))
        }
        Err(err) => {
            state.logger().error(&format!("[Chat] failed: {}", err));
            Ok(Json(ChatResponse {
                response: format!("An error occurred: {}", err),
                used_tools: Vec::new(),
                status: "error".to_string(),
                trace: Trace {
                    thread_id: request.thread_id,
                    error: Some(err.to_string()),
                    ..Default::default()
                },
            }))
        }
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let tools_available = state.tools().tool_count();

    let response = match state.status() {
        AppStatus::Starting => HealthResponse {
            status: "starting".to_string(),
            details: json!({
                "mcp_client": "initializing",
                "workflow": "initializing",
                "tools_available": 0,
            }),
        },
        AppStatus::Ready => {
            let session = state.manager().health_check().await;
            let status = match session.status {
                HealthStatus::Connected => "ok",
                HealthStatus::Disconnected => "degraded",
                HealthStatus::Error => "error",
            };
            HealthResponse {
                status: status.to_string(),
                details: json!({
                    "mcp_client": session,
                    "workflow": "ready",
                    "tools_available": tools_available,
                }),
            }
        }
        failed @ (AppStatus::ConnectFailed(_) | AppStatus::ConnectError(_)) => HealthResponse {
            status: "degraded".to_string(),
            details: json!({
                "mcp_client": "connection_failed",
                "workflow": "not_available",
                "tools_available": tools_available,
                "note": failed.label(),
            }),
        },
    };

    Json(response)
}

async fn workflow_info(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "success",
        "workflow_info": state.workflow().info(),
    }))
}

async fn root(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": "GitHub Agent API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": state.status().label(),
        "endpoints": {
            "chat": "/chat",
            "health": "/health",
            "workflow_info": "/workflow/info",
        },
    }))
}
