//! MCP request dispatch, shared by every transport.

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::GatewayError;
use crate::protocol::{
    self, Request, RequestId, Response, RpcError, PROTOCOL_VERSION, SERVER_NAME, SERVER_VERSION,
};
use crate::tools::{self, ToolContext};
use crate::{prompts, resources};

/// Stateless MCP server. Concurrent calls share nothing but the HTTP client.
#[derive(Debug, Clone)]
pub struct McpServer {
    ctx: ToolContext,
}

impl McpServer {
    pub fn new(ctx: ToolContext) -> Self {
        Self { ctx }
    }

    pub fn from_config(config: &Config) -> Result<Self, GatewayError> {
        let client = muav_client::PlatformClient::new(config.client_settings())?;
        Ok(Self::new(ToolContext {
            client,
            output: config.output_format,
            coverage: config.target_coverage(),
        }))
    }

    /// Handle one raw message. `None` means nothing is sent back (notifications).
    pub async fn handle_message(&self, message: &str) -> Option<Response> {
        match protocol::parse_request_str(message) {
            Ok(request) => self.handle_request(request).await,
            Err(err) => {
                warn!(error = %err.message(), "rejected message");
                Some(Response::from_error(RequestId::Null, err))
            }
        }
    }

    pub async fn handle_request(&self, request: Request) -> Option<Response> {
        if request.is_notification() {
            debug!(method = %request.method, "notification");
            return None;
        }
        let id = request.id.clone().unwrap_or(RequestId::Null);
        let params = request.params.unwrap_or(Value::Null);

        let outcome = match request.method.as_str() {
            "initialize" => Ok(self.initialize()),
            "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": tools::definitions() })),
            "tools/call" => self.call_tool(params).await,
            "resources/list" => Ok(json!({ "resources": resources::list() })),
            "resources/templates/list" => Ok(json!({ "resourceTemplates": resources::templates() })),
            "resources/read" => self.read_resource(params).await,
            "prompts/list" => Ok(json!({ "prompts": prompts::list() })),
            "prompts/get" => self.get_prompt(params).await,
            other => {
                warn!(method = other, "unknown method");
                Err(RpcError::MethodNotFound(other.to_string()))
            }
        };

        Some(match outcome {
            Ok(result) => Response::success(id, result),
            Err(err) => Response::from_error(id, err),
        })
    }

    fn initialize(&self) -> Value {
        info!("client initialized");
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {},
                "resources": {},
                "prompts": {}
            },
            "serverInfo": {
                "name": SERVER_NAME,
                "version": SERVER_VERSION
            }
        })
    }

    async fn call_tool(&self, params: Value) -> Result<Value, RpcError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::InvalidParams("missing 'name' field".to_string()))?;
        if !tools::is_known(name) {
            return Err(GatewayError::UnknownTool(name.to_string()).to_rpc());
        }
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        debug!(tool = name, "calling tool");
        let result = match tools::call(&self.ctx, name, arguments).await {
            Ok(result) => result,
            Err(err) => {
                warn!(tool = name, error = %err, "tool failed");
                protocol::ToolResult::error(err.to_string())
            }
        };
        serde_json::to_value(result).map_err(|e| RpcError::InternalError(e.to_string()))
    }

    async fn read_resource(&self, params: Value) -> Result<Value, RpcError> {
        let uri = params
            .get("uri")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::InvalidParams("missing 'uri' field".to_string()))?;
        resources::read(&self.ctx.client, uri)
            .await
            .map_err(|err| err.to_rpc())
    }

    async fn get_prompt(&self, params: Value) -> Result<Value, RpcError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::InvalidParams("missing 'name' field".to_string()))?;
        prompts::get(&self.ctx.client, name)
            .await
            .map_err(|err| err.to_rpc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::offline_context;

    fn server() -> McpServer {
        McpServer::new(offline_context())
    }

    async fn roundtrip(message: Value) -> Value {
        let response = server()
            .handle_message(&message.to_string())
            .await
            .expect("response");
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn initialize_advertises_capabilities() {
        let resp = roundtrip(json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}})).await;
        assert_eq!(resp["result"]["serverInfo"]["name"], "muav_gui_assistant");
        assert_eq!(resp["result"]["protocolVersion"], "2024-11-05");
        assert!(resp["result"]["capabilities"]["prompts"].is_object());
    }

    #[tokio::test]
    async fn notifications_get_no_reply() {
        let reply = server()
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(reply.is_none());
    }

    #[tokio::test]
    async fn lists_tools_resources_and_prompts() {
        let tools = roundtrip(json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        assert!(tools["result"]["tools"].as_array().unwrap().len() >= 20);
        assert!(tools["result"]["tools"][0]["inputSchema"].is_object());

        let templates =
            roundtrip(json!({"jsonrpc": "2.0", "id": 3, "method": "resources/templates/list"})).await;
        assert_eq!(templates["result"]["resourceTemplates"][0]["uriTemplate"], "device://{id}");

        let prompts = roundtrip(json!({"jsonrpc": "2.0", "id": 4, "method": "prompts/list"})).await;
        assert_eq!(prompts["result"]["prompts"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn unknown_method_and_tool_are_rpc_errors() {
        let resp = roundtrip(json!({"jsonrpc": "2.0", "id": 5, "method": "sampling/createMessage"})).await;
        assert_eq!(resp["error"]["code"], -32601);

        let resp = roundtrip(json!({
            "jsonrpc": "2.0", "id": 6, "method": "tools/call",
            "params": {"name": "nope", "arguments": {}}
        }))
        .await;
        assert_eq!(resp["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn invalid_tool_arguments_become_error_results() {
        let resp = roundtrip(json!({
            "jsonrpc": "2.0", "id": 7, "method": "tools/call",
            "params": {
                "name": "load_mission_to_uav",
                "arguments": {"deviceId": 1, "routes": [{
                    "name": "r", "uav": "px4_1", "id": 0, "uav_type": "px4_sitl",
                    "attributes": {"max_vel": 12, "idle_vel": 3, "mode_yaw": 2, "mode_gimbal": 0, "mode_trace": 0, "mode_landing": 2},
                    "wp": [{"pos": [47.3978, 8.5461, 10]}, {"pos": [47.3978, 190, 10]}]
                }]}
            }
        }))
        .await;
        assert_eq!(resp["result"]["isError"], true);
        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("routes[0].wp[1].pos.lng: Longitude must be between -180 and 180"));
    }

    #[tokio::test]
    async fn unreachable_platform_is_an_error_result() {
        let resp = roundtrip(json!({
            "jsonrpc": "2.0", "id": 8, "method": "tools/call",
            "params": {"name": "get_missions"}
        }))
        .await;
        assert_eq!(resp["result"]["isError"], true);
    }

    #[tokio::test]
    async fn unknown_resource_is_invalid_params() {
        let resp = roundtrip(json!({
            "jsonrpc": "2.0", "id": 9, "method": "resources/read",
            "params": {"uri": "weather://today"}
        }))
        .await;
        assert_eq!(resp["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn malformed_json_gets_parse_error() {
        let reply = server().handle_message("{oops").await.unwrap();
        let wire = serde_json::to_value(reply).unwrap();
        assert_eq!(wire["error"]["code"], -32700);
        assert_eq!(wire["id"], Value::Null);
    }
}
