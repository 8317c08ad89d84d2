//! Bridge from a validated API key to one upstream call.

use std::future::Future;

use serde::Serialize;

use crate::client::UpstreamClient;
use crate::config::Config;
use crate::error::{ClientResult, ToolError, ToolResult};

/// Prefix of every error string returned by the bridge.
pub const ERROR_PREFIX: &str = "Tool error: ";

/// Runs upstream operations on behalf of a request.
///
/// A fresh client is built per call. Callers always get a string back: the
/// serialized payload on success, or text starting with [`ERROR_PREFIX`].
#[derive(Debug, Clone)]
pub struct CapabilityBridge {
    config: Config,
}

impl CapabilityBridge {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run `operation` with a client authenticated by `api_key`.
    pub async fn invoke<F, Fut, T>(&self, api_key: Option<&str>, operation: F) -> String
    where
        F: FnOnce(UpstreamClient) -> Fut + Send,
        Fut: Future<Output = ClientResult<T>> + Send,
        T: Serialize,
    {
        match self.try_invoke(api_key, operation).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(error = %e, "Tool error");
                format!("{ERROR_PREFIX}{}", e.to_user_message())
            }
        }
    }

    async fn try_invoke<F, Fut, T>(&self, api_key: Option<&str>, operation: F) -> ToolResult<String>
    where
        F: FnOnce(UpstreamClient) -> Fut + Send,
        Fut: Future<Output = ClientResult<T>> + Send,
        T: Serialize,
    {
        let api_key = api_key.filter(|k| !k.is_empty()).ok_or(ToolError::Unauthenticated)?;
        let client = UpstreamClient::new(&self.config, api_key)?;
        let payload = operation(client).await?;
        Ok(serde_json::to_string(&payload)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    fn bridge() -> CapabilityBridge {
        CapabilityBridge::new(Config::for_testing("http://127.0.0.1:9"))
    }

    #[tokio::test]
    async fn test_missing_key_is_error_text() {
        let out = bridge().invoke(None, |_client| async { Ok::<_, ClientError>(42) }).await;
        assert_eq!(out, "Tool error: No API key found");

        let out = bridge().invoke(Some(""), |_client| async { Ok::<_, ClientError>(42) }).await;
        assert!(out.starts_with(ERROR_PREFIX));
    }

    #[tokio::test]
    async fn test_success_is_serialized() {
        let out = bridge()
            .invoke(Some("k"), |_client| async { Ok::<_, ClientError>(vec!["a", "b"]) })
            .await;
        assert_eq!(out, r#"["a","b"]"#);
    }

    #[tokio::test]
    async fn test_failure_is_error_text() {
        let out = bridge()
            .invoke(Some("k"), |_client| async {
                Err::<(), _>(ClientError::server(502, "bad gateway"))
            })
            .await;
        assert!(out.starts_with(ERROR_PREFIX));
        assert!(out.contains("502"));
    }
}
