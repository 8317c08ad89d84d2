//! Project listing tool.

use serde_json::json;

use super::{McpTool, ToolContext};
use crate::error::ToolResult;
use crate::models::Projects;

/// Lists the upstream projects visible to the caller's API key.
pub struct ListProjectsTool;

#[async_trait::async_trait]
impl McpTool for ListProjectsTool {
    fn name(&self) -> &'static str {
        "list_projects"
    }

    fn description(&self) -> &'static str {
        "List the projects available to the authenticated user's API key."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, ctx: &ToolContext, _input: serde_json::Value) -> ToolResult<String> {
        let output = ctx
            .bridge
            .invoke(ctx.api_key(), |client| async move {
                client.list_projects().await.map(Projects::from)
            })
            .await;

        Ok(output)
    }
}
