//! Tool tests against a mocked upstream API.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use oauth_key_bridge::config::Config;
use oauth_key_bridge::server::oauth::{Claims, ValidatedCredential};
use oauth_key_bridge::tools::{self, CapabilityBridge, McpTool, ToolContext};

fn context(mock_server: &MockServer, api_key: Option<&str>) -> ToolContext {
    let bridge = Arc::new(CapabilityBridge::new(Config::for_testing(&mock_server.uri())));
    let credential = api_key.map(|k| ValidatedCredential::from_claims("token", Claims::access_token(k)));
    ToolContext::new(bridge, credential)
}

fn list_projects() -> Box<dyn McpTool> {
    tools::register_all_tools().into_iter().find(|t| t.name() == "list_projects").unwrap()
}

#[tokio::test]
async fn test_list_projects_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .and(header("Authorization", "Bearer sk-tool"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "p1", "name": "Alpha", "organization_id": "org-1" },
            { "id": "p2", "name": "Beta" }
        ])))
        .mount(&mock_server)
        .await;

    let out = list_projects().execute(&context(&mock_server, Some("sk-tool")), json!({})).await.unwrap();
    let payload: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(payload["projects"].as_array().unwrap().len(), 2);
    assert_eq!(payload["projects"][0]["organization_id"], "org-1");
    assert!(payload["projects"][1].get("organization_id").is_none());
}

#[tokio::test]
async fn test_list_projects_without_key() {
    let mock_server = MockServer::start().await;

    let out = list_projects().execute(&context(&mock_server, None), json!({})).await.unwrap();
    assert_eq!(out, "Tool error: No API key found");
}

#[tokio::test]
async fn test_list_projects_upstream_errors_become_text() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let out = list_projects().execute(&context(&mock_server, Some("k")), json!({})).await.unwrap();
    assert!(out.starts_with("Tool error: "));
}

#[tokio::test]
async fn test_list_projects_unparseable_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
        .mount(&mock_server)
        .await;

    let out = list_projects().execute(&context(&mock_server, Some("k")), json!({})).await.unwrap();
    assert!(out.starts_with("Tool error: "));
}
