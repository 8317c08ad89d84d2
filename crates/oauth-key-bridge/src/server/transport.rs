//! HTTP transport.
//!
//! Serves the OAuth endpoints and a bearer-protected MCP JSON-RPC endpoint.
//! Every `/mcp` request decodes its bearer token afresh; there are no sessions.

use std::borrow::Cow;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::oauth::{OAuthProvider, ValidatedCredential, handlers};
use crate::config::Config;
use crate::tools::{self, CapabilityBridge, ERROR_PREFIX, McpTool, ToolContext};

/// URI of the server configuration resource.
pub const CONFIG_RESOURCE_URI: &str = "config://server";

/// JSON-RPC 2.0 request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 error.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// JSON-RPC version constant.
    const VERSION: &'static str = "2.0";

    #[must_use]
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self { jsonrpc: Cow::Borrowed(Self::VERSION), result: Some(result), error: None, id }
    }

    #[must_use]
    pub fn error(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: Cow::Borrowed(Self::VERSION),
            result: None,
            error: Some(JsonRpcError { code, message: message.into(), data: None }),
            id,
        }
    }
}

/// MCP tool info for tools/list response.
#[derive(Debug, Serialize)]
pub struct McpToolInfo {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

/// Shared state for HTTP handlers.
pub struct HttpState {
    pub tools: Vec<Box<dyn McpTool>>,
    pub bridge: Arc<CapabilityBridge>,
    pub oauth: OAuthProvider,
    pub config: Config,
}

/// Create the HTTP router with an HTTP API key probe.
///
/// # Errors
///
/// Returns error if an HTTP client cannot be built.
pub fn create_router(config: Config) -> anyhow::Result<Router> {
    let oauth = OAuthProvider::new(&config)?;
    Ok(create_router_with_provider(config, oauth))
}

/// Create the HTTP router around an existing OAuth provider.
pub fn create_router_with_provider(config: Config, oauth: OAuthProvider) -> Router {
    let state = Arc::new(HttpState {
        tools: tools::register_all_tools(),
        bridge: Arc::new(CapabilityBridge::new(config.clone())),
        oauth,
        config,
    });

    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        // OAuth discovery
        .route("/.well-known/oauth-authorization-server", get(handlers::handle_auth_server_metadata))
        .route("/.well-known/oauth-protected-resource", get(handlers::handle_protected_resource))
        // OAuth flow
        .route("/register", post(handlers::handle_register))
        .route(
            "/authorize",
            get(handlers::handle_authorize_get).post(handlers::handle_authorize_post),
        )
        .route("/token", post(handlers::handle_token))
        // MCP
        .route("/mcp", post(handle_mcp_post))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "oauth-key-bridge",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Service information and endpoint listing.
async fn service_info() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "OAuth-from-API-Key Bridge",
        "description": "Bridges OAuth authentication with API key-based services",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "oauth_authorize": "/authorize",
            "oauth_token": "/token",
            "oauth_register": "/register",
            "mcp_server": "/mcp"
        }
    }))
}

/// Extract and validate the bearer credential from request headers.
async fn authenticate(state: &HttpState, headers: &HeaderMap) -> Option<ValidatedCredential> {
    let auth = headers.typed_get::<Authorization<Bearer>>()?;
    state.oauth.validator.validate(auth.token()).await
}

/// 401 pointing the client at the protected resource metadata.
fn unauthorized(state: &HttpState) -> Response {
    let challenge = format!(
        r#"Bearer error="invalid_token", resource_metadata="{}""#,
        state.config.endpoint("/.well-known/oauth-protected-resource")
    );

    let mut response = (
        StatusCode::UNAUTHORIZED,
        Json(JsonRpcResponse::error(None, -32001, "Missing or invalid bearer token")),
    )
        .into_response();

    if let Ok(value) = HeaderValue::from_str(&challenge) {
        response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
    }
    response
}

/// Handle POST requests to /mcp.
async fn handle_mcp_post(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(credential) = authenticate(&state, &headers).await else {
        return unauthorized(&state);
    };

    let req: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(req) => req,
        Err(e) => {
            return Json(JsonRpcResponse::error(None, -32700, format!("Parse error: {e}")))
                .into_response();
        }
    };

    tracing::debug!(method = %req.method, "Handling MCP POST request");

    let is_notification = req.id.is_none();

    let response = match req.method.as_str() {
        "initialize" => JsonRpcResponse::success(req.id, handle_initialize(&req.params)),
        "notifications/initialized" | "initialized" | "notifications/cancelled" => {
            if is_notification {
                return StatusCode::ACCEPTED.into_response();
            }
            JsonRpcResponse::success(req.id, serde_json::json!({}))
        }
        "ping" => JsonRpcResponse::success(req.id, serde_json::json!({})),
        "tools/list" => handle_tools_list(req.id, &state.tools),
        "tools/call" => {
            let ctx = ToolContext::new(Arc::clone(&state.bridge), Some(credential));
            handle_tools_call(req.id, &req.params, &state.tools, &ctx).await
        }
        "resources/list" => handle_resources_list(req.id),
        "resources/read" => handle_resources_read(req.id, &req.params, &state.config),
        _ => {
            if is_notification {
                return StatusCode::ACCEPTED.into_response();
            }
            JsonRpcResponse::error(req.id, -32601, format!("Method not found: {}", req.method))
        }
    };

    Json(response).into_response()
}

fn handle_initialize(params: &serde_json::Value) -> serde_json::Value {
    let protocol_version = params
        .get("protocolVersion")
        .and_then(|v| v.as_str())
        .unwrap_or("2024-11-05");

    tracing::info!("MCP initialize: protocol version {}", protocol_version);

    serde_json::json!({
        "protocolVersion": protocol_version,
        "capabilities": {
            "tools": { "listChanged": false },
            "resources": { "listChanged": false }
        },
        "serverInfo": {
            "name": "oauth-key-bridge",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

fn handle_tools_list(id: Option<serde_json::Value>, tools: &[Box<dyn McpTool>]) -> JsonRpcResponse {
    let tool_list: Vec<McpToolInfo> = tools
        .iter()
        .map(|t| McpToolInfo {
            name: t.name().to_string(),
            description: t.description().to_string(),
            input_schema: t.input_schema(),
        })
        .collect();

    JsonRpcResponse::success(id, serde_json::json!({ "tools": tool_list }))
}

async fn handle_tools_call(
    id: Option<serde_json::Value>,
    params: &serde_json::Value,
    tools: &[Box<dyn McpTool>],
    ctx: &ToolContext,
) -> JsonRpcResponse {
    let Some(tool_name) = params.get("name").and_then(|v| v.as_str()) else {
        return JsonRpcResponse::error(id, -32602, "Missing 'name' parameter");
    };

    let arguments = params.get("arguments").cloned().unwrap_or(serde_json::json!({}));

    let Some(tool) = tools.iter().find(|t| t.name() == tool_name) else {
        return JsonRpcResponse::error(id, -32602, format!("Tool not found: {}", tool_name));
    };

    tracing::info!(tool = %tool_name, "Executing tool");

    match tool.execute(ctx, arguments).await {
        Ok(result) => {
            let is_error = result.starts_with(ERROR_PREFIX);
            JsonRpcResponse::success(
                id,
                serde_json::json!({
                    "content": [{
                        "type": "text",
                        "text": result
                    }],
                    "isError": is_error
                }),
            )
        }
        Err(e) => {
            tracing::error!(tool = %tool_name, error = %e, "Tool execution failed");
            JsonRpcResponse::error(id, -32000, format!("{ERROR_PREFIX}{}", e.to_user_message()))
        }
    }
}

fn handle_resources_list(id: Option<serde_json::Value>) -> JsonRpcResponse {
    JsonRpcResponse::success(
        id,
        serde_json::json!({
            "resources": [{
                "uri": CONFIG_RESOURCE_URI,
                "name": "get_server_config",
                "description": "Get server configuration info",
                "mimeType": "text/plain"
            }]
        }),
    )
}

fn handle_resources_read(
    id: Option<serde_json::Value>,
    params: &serde_json::Value,
    config: &Config,
) -> JsonRpcResponse {
    let uri = params.get("uri").and_then(|v| v.as_str()).unwrap_or_default();
    if uri != CONFIG_RESOURCE_URI {
        return JsonRpcResponse::error(id, -32002, format!("Resource not found: {uri}"));
    }

    JsonRpcResponse::success(
        id,
        serde_json::json!({
            "contents": [{
                "uri": CONFIG_RESOURCE_URI,
                "mimeType": "text/plain",
                "text": format!("Combined OAuth + MCP Server running on {}", config.issuer_url)
            }]
        }),
    )
}
