//! HTTP transport implementation.
//!
//! Serves three surfaces from one axum router:
//! - JSON-RPC 2.0 over `POST {rpc_path}` for MCP clients
//! - a REST bridge under `/api/v1/tools` for plain HTTP clients
//! - probes: `/health`, `/ready`, `/metrics` and `/openapi.json`
//!
//! All tool calls go through the same [`ToolBridge`](crate::domains::tools::ToolBridge)
//! dispatch as the stdio transport.

use axum::{
    Json, Router,
    extract::{Path, Query, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use rmcp::ServerHandler;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, warn};

use super::openapi;
use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;
use crate::domains::tools::{ToolCategory, ToolError, ToolOutput, to_mcp_result};

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Attach structured `data` to an error response.
    pub fn with_data(mut self, data: Option<Value>) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.data = data;
        }
        self
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<Value>) -> Self {
        Self::error(id, -32601, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, -32600, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32602, msg)
    }

    /// Internal error.
    pub fn internal_error(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, -32603, msg)
    }

    fn serialized<T: Serialize>(id: Option<Value>, result: &T) -> Self {
        match serde_json::to_value(result) {
            Ok(value) => Self::success(id, value),
            Err(e) => Self::internal_error(id, e.to_string()),
        }
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    server: McpServer,
    rpc_path: String,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = router(server, &self.config);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.enable_cors {
            "enabled"
        } else {
            "disabled"
        };
        info!("Ready - listening on {} (CORS {})", addr, cors_status);
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → REST:     GET/POST /api/v1/tools[/{{name}}]");
        info!("  → Probes:   GET /health, /ready, /metrics, /openapi.json");

        axum::serve(listener, app)
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

/// Build the axum router for `server`.
pub fn router(server: McpServer, config: &HttpConfig) -> Router {
    let state = AppState {
        server,
        rpc_path: config.rpc_path.clone(),
    };

    let mut app = Router::new()
        .route(&config.rpc_path, post(handle_rpc))
        .route("/api/v1/tools", get(list_tools))
        .route("/api/v1/tools/{name}", get(describe_tool).post(call_tool))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .route("/openapi.json", get(openapi_document))
        .route("/", get(root_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "rpc": state.rpc_path,
            "tools": "/api/v1/tools",
            "health": "/health",
            "ready": "/ready",
            "metrics": "/metrics",
            "openapi": "/openapi.json"
        },
        "protocol": "JSON-RPC 2.0"
    }))
}

// ============================================================================
// Probes
// ============================================================================

/// Liveness: the process is up.
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "version": state.server.version(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Readiness: NetBox answers its status endpoint.
async fn readiness_check(State(state): State<AppState>) -> Response {
    match state.server.check_netbox().await {
        Ok(status) => Json(json!({
            "status": "ready",
            "netbox": {"version": status.get("netbox-version").cloned().unwrap_or(Value::Null)},
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
        .into_response(),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "error": e.to_string(),
                    "timestamp": chrono::Utc::now().to_rfc3339()
                })),
            )
                .into_response()
        }
    }
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.server.render_metrics(),
    )
}

async fn openapi_document(State(state): State<AppState>) -> impl IntoResponse {
    Json(openapi::document(
        state.server.bridge().registry(),
        state.server.name(),
        state.server.version(),
    ))
}

// ============================================================================
// REST tool bridge
// ============================================================================

#[derive(Debug, Deserialize)]
struct ToolsQuery {
    category: Option<String>,
}

/// HTTP status for a failed tool call.
fn status_for(error: &ToolError) -> StatusCode {
    match error {
        ToolError::UnknownTool(_) | ToolError::NotFound { .. } => StatusCode::NOT_FOUND,
        ToolError::MissingParameters { .. } | ToolError::Validation(_) => StatusCode::BAD_REQUEST,
        ToolError::Conflict { .. } => StatusCode::CONFLICT,
        ToolError::Upstream(_) => StatusCode::BAD_GATEWAY,
        ToolError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: &ToolError) -> Response {
    (status_for(error), Json(ToolOutput::failure(error).to_value())).into_response()
}

async fn list_tools(State(state): State<AppState>, Query(query): Query<ToolsQuery>) -> Response {
    let registry = state.server.bridge().registry();

    let category = match query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(raw) => match ToolCategory::parse(raw) {
            Some(category) => Some(category),
            None => {
                return error_response(&ToolError::validation(format!(
                    "unknown category '{raw}' (expected system, dcim, ipam or tenancy)"
                )));
            }
        },
        None => None,
    };

    let tools: Vec<Value> = registry
        .descriptors()
        .filter(|t| category.is_none_or(|c| t.category == c))
        .map(|t| t.summary())
        .collect();

    let mut categories: Vec<&'static str> = registry.descriptors().map(|t| t.category.as_str()).collect();
    categories.dedup();

    Json(json!({
        "count": tools.len(),
        "categories": categories,
        "tools": tools
    }))
    .into_response()
}

async fn describe_tool(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.server.bridge().registry().get(&name) {
        Some(tool) => Json(tool.summary()).into_response(),
        None => error_response(&ToolError::UnknownTool(name)),
    }
}

/// Execute a tool. The body may be a JSON object, a JSON string or a
/// form-urlencoded string; an empty body falls back to the URL query.
#[instrument(skip_all, fields(tool = %name))]
async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let bundle = match request_bundle(&headers, &body, query) {
        Ok(bundle) => bundle,
        Err(e) => return error_response(&e),
    };

    match state.server.call_tool(&name, bundle).await {
        Ok(output) => Json(output.to_value()).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Turn an HTTP request into a raw parameter bundle for the normalizer.
fn request_bundle(headers: &HeaderMap, body: &[u8], query: Option<String>) -> Result<Value, ToolError> {
    let text = std::str::from_utf8(body)
        .map_err(|_| ToolError::validation("request body is not valid UTF-8"))?
        .trim();

    if text.is_empty() {
        return Ok(query
            .filter(|q| !q.is_empty())
            .map(Value::String)
            .unwrap_or(Value::Null));
    }

    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    if is_form {
        return Ok(Value::String(text.to_string()));
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(e) => {
            debug!("Body is not JSON ({}), passing it through as a string", e);
            Ok(Value::String(text.to_string()))
        }
    }
}

// ============================================================================
// JSON-RPC
// ============================================================================

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(State(state): State<AppState>, Json(request): Json<JsonRpcRequest>) -> Response {
    tracing::Span::current().record("method", request.method.as_str());
    debug!("Received JSON-RPC request: {}", request.method);

    if request.id.is_none() && request.method.starts_with("notifications/") {
        info!("Received notification: {}", request.method);
        return StatusCode::ACCEPTED.into_response();
    }

    Json(process_request(&state, request).await).into_response()
}

/// Process a JSON-RPC request and return the response.
async fn process_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => JsonRpcResponse::serialized(request.id, &state.server.get_info()),
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        "tools/list" => JsonRpcResponse::success(request.id, json!({"tools": state.server.list_tools()})),
        "tools/call" => handle_tools_call(state, request).await,
        method if method.starts_with("notifications/") => JsonRpcResponse::success(request.id, Value::Null),
        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

/// Handle tools/call request.
async fn handle_tools_call(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let params = match request.params {
        Some(p) => p,
        None => return JsonRpcResponse::invalid_params(request.id, "Missing params"),
    };

    let name = match params.get("name").and_then(Value::as_str) {
        Some(n) => n.to_string(),
        None => return JsonRpcResponse::invalid_params(request.id, "Missing tool name"),
    };

    let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

    match to_mcp_result(state.server.call_tool(&name, arguments).await) {
        Ok(result) => JsonRpcResponse::serialized(request.id, &result),
        Err(e) => JsonRpcResponse::error(request.id, e.code.0, e.message).with_data(e.data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{CacheConfig, Config};
    use crate::core::netbox::testing::InMemoryNetBox;
    use crate::core::netbox::NetBoxClient;
    use axum::body::Body;
    use http::Request;
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<InMemoryNetBox>) {
        let backend = Arc::new(InMemoryNetBox::seeded());
        let client = Arc::new(NetBoxClient::new(backend.clone(), &CacheConfig::default()));
        let server = McpServer::with_client(Config::default(), client).unwrap();
        (router(server, &HttpConfig::default()), backend)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn rpc(method: &str, params: Value) -> Request<Body> {
        post_json("/mcp", json!({"jsonrpc": "2.0", "id": 1, "method": method, "params": params}))
    }

    #[tokio::test]
    async fn test_health_and_ready() {
        let (app, backend) = app();

        let (status, body) = send(&app, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, body) = send(&app, get_req("/ready")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");

        backend.set_unavailable(true);
        let (status, body) = send(&app, get_req("/ready")).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not_ready");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let (app, _) = app();
        send(&app, post_json("/api/v1/tools/netbox_list_sites", json!({}))).await;

        let response = app.clone().oneshot(get_req("/metrics")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; version=0.0.4"
        );
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("netbox_mcp_tool_calls_total{tool=\"netbox_list_sites\"} 1"));
    }

    #[tokio::test]
    async fn test_openapi_endpoint() {
        let (app, _) = app();
        let (status, body) = send(&app, get_req("/openapi.json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["openapi"], "3.1.0");
        assert!(body["paths"]["/api/v1/tools/netbox_create_device"]["post"].is_object());
    }

    #[tokio::test]
    async fn test_tool_discovery() {
        let (app, _) = app();

        let (status, body) = send(&app, get_req("/api/v1/tools")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 15);
        assert_eq!(body["categories"], json!(["system", "dcim", "ipam", "tenancy"]));

        let (_, body) = send(&app, get_req("/api/v1/tools?category=ipam")).await;
        assert_eq!(body["count"], 3);

        let (status, body) = send(&app, get_req("/api/v1/tools?category=circuits")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["type"], "validation");

        let (status, body) = send(&app, get_req("/api/v1/tools/netbox_create_vlan")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mutating"], true);
        assert_eq!(body["parameters"][0]["name"], "name");

        let (status, body) = send(&app, get_req("/api/v1/tools/netbox_nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "unknown_tool");
    }

    #[tokio::test]
    async fn test_rest_call_encodings() {
        let (app, _) = app();

        let (status, body) = send(&app, post_json("/api/v1/tools/netbox_get_site", json!({"site": "dc1"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "DC 1");

        let (status, body) = send(
            &app,
            post_json("/api/v1/tools/netbox_get_site", json!("{\"site\": \"dc1\"}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "DC 1");

        let form = Request::builder()
            .method("POST")
            .uri("/api/v1/tools/netbox_get_site")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("site=dc1"))
            .unwrap();
        let (status, body) = send(&app, form).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "DC 1");

        let query_only = Request::builder()
            .method("POST")
            .uri("/api/v1/tools/netbox_get_site?site=dc1")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, query_only).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "DC 1");
    }

    #[tokio::test]
    async fn test_rest_writes_are_gated() {
        let (app, backend) = app();

        let (status, body) = send(&app, post_json("/api/v1/tools/netbox_create_tenant", json!({"name": "Globex"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["dry_run"], true);
        assert_eq!(backend.mutations(), 0);

        let (status, body) = send(
            &app,
            post_json("/api/v1/tools/netbox_create_tenant", json!({"name": "Globex", "confirm": true})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("dry_run").is_none());
        assert_eq!(backend.mutations(), 1);
    }

    #[tokio::test]
    async fn test_rest_error_status_codes() {
        let (app, backend) = app();

        let (status, body) = send(&app, post_json("/api/v1/tools/netbox_create_vlan", json!({"name": "x"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["missing"], json!(["vid"]));

        let (status, body) = send(&app, post_json("/api/v1/tools/netbox_get_site", json!({"site": "dc9"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["type"], "not_found");

        let (status, body) = send(
            &app,
            post_json("/api/v1/tools/netbox_create_tenant", json!({"name": "Acme", "confirm": true})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["type"], "conflict");

        let (status, _) = send(&app, post_json("/api/v1/tools/netbox_missing", json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        backend.set_unavailable(true);
        let (status, body) = send(&app, post_json("/api/v1/tools/netbox_list_tenants", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["type"], "upstream");
    }

    #[tokio::test]
    async fn test_rpc_initialize_and_list() {
        let (app, _) = app();

        let (status, body) = send(&app, rpc("initialize", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["result"]["serverInfo"]["name"], "netbox-mcp-server");
        assert!(body["result"]["capabilities"]["tools"].is_object());
        assert!(body["result"]["capabilities"]["prompts"].is_null());

        let (_, body) = send(&app, rpc("tools/list", json!({}))).await;
        assert_eq!(body["result"]["tools"].as_array().unwrap().len(), 15);

        let (_, body) = send(&app, rpc("ping", json!({}))).await;
        assert_eq!(body["result"], json!({}));

        let (_, body) = send(&app, rpc("resources/list", json!({}))).await;
        assert_eq!(body["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_rpc_tools_call() {
        let (app, _) = app();

        let (_, body) = send(
            &app,
            rpc("tools/call", json!({"name": "netbox_get_site", "arguments": {"site": "dc1"}})),
        )
        .await;
        assert_eq!(body["result"]["isError"], false);
        assert_eq!(body["result"]["structuredContent"]["data"]["name"], "DC 1");

        let (_, body) = send(
            &app,
            rpc("tools/call", json!({"name": "netbox_get_site", "arguments": "site=dc1"})),
        )
        .await;
        assert_eq!(body["result"]["structuredContent"]["data"]["name"], "DC 1");

        let (_, body) = send(&app, rpc("tools/call", json!({"name": "netbox_create_vlan", "arguments": {}}))).await;
        assert_eq!(body["error"]["code"], -32602);
        assert_eq!(body["error"]["data"]["type"], "validation");

        let (_, body) = send(&app, rpc("tools/call", json!({"name": "netbox_bogus"}))).await;
        assert_eq!(body["error"]["data"]["type"], "unknown_tool");

        let (_, body) = send(
            &app,
            rpc("tools/call", json!({"name": "netbox_get_site", "arguments": {"site": "dc9"}})),
        )
        .await;
        assert!(body["error"].is_null());
        assert_eq!(body["result"]["isError"], true);
        assert_eq!(body["result"]["structuredContent"]["error"]["type"], "not_found");
    }

    #[tokio::test]
    async fn test_rpc_notifications_and_version() {
        let (app, _) = app();

        let notification = post_json(
            "/mcp",
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        );
        let response = app.clone().oneshot(notification).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);

        let (_, body) = send(
            &app,
            post_json("/mcp", json!({"jsonrpc": "1.0", "id": 3, "method": "ping"})),
        )
        .await;
        assert_eq!(body["error"]["code"], -32600);
    }

    #[test]
    fn test_request_bundle() {
        let empty = HeaderMap::new();
        assert_eq!(request_bundle(&empty, b"", None).unwrap(), Value::Null);
        assert_eq!(
            request_bundle(&empty, b"  ", Some("a=1".into())).unwrap(),
            json!("a=1")
        );
        assert_eq!(request_bundle(&empty, b"{\"a\":1}", None).unwrap(), json!({"a": 1}));
        assert_eq!(request_bundle(&empty, b"a=1&b=2", None).unwrap(), json!("a=1&b=2"));
        assert!(request_bundle(&empty, &[0xff, 0xfe], None).is_err());
    }
}
