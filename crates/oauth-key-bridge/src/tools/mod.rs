//! MCP tool implementations.
//!
//! Tools never call the upstream service directly: they go through the
//! [`CapabilityBridge`], which builds a client for the caller's API key and
//! turns every failure into error text.

mod bridge;
mod projects;

pub use bridge::{CapabilityBridge, ERROR_PREFIX};
pub use projects::ListProjectsTool;

use std::sync::Arc;

use crate::error::ToolResult;
use crate::server::oauth::ValidatedCredential;

/// Tool execution context, built per request.
pub struct ToolContext {
    /// Upstream bridge.
    pub bridge: Arc<CapabilityBridge>,

    /// Credential presented with the request, if any.
    pub credential: Option<ValidatedCredential>,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub fn new(bridge: Arc<CapabilityBridge>, credential: Option<ValidatedCredential>) -> Self {
        Self { bridge, credential }
    }

    /// API key carried by the request credential.
    #[must_use]
    pub fn api_key(&self) -> Option<&str> {
        self.credential.as_ref().map(|c| c.api_key.as_str())
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "list_projects").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given input.
    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String>;
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![Box::new(projects::ListProjectsTool)]
}
