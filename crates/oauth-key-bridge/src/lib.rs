//! OAuth Key Bridge
//!
//! A stateless OAuth 2.0 authorization server that lets OAuth-speaking MCP
//! clients use services that only understand API keys. A human pastes their
//! API key into an authorization form once; the key is sealed inside a signed
//! authorization code, exchanged for a long-lived signed access token, and
//! recovered from that bearer token on every request.
//!
//! # Features
//!
//! - **Stateless**: codes and tokens are self-contained HS256 JWTs
//! - **Discovery**: RFC 8414 / RFC 9728 metadata, RFC 7591 registration
//! - **MCP endpoint**: bearer-protected JSON-RPC with a `list_projects` tool
//!
//! # Trade-offs
//!
//! - Codes can be replayed within their 5-minute window
//! - Revocation only drops bookkeeping; rotating the signing secret is the
//!   only way to invalidate outstanding tokens
//! - The API key probe is fail-open
//!
//! # Example
//!
//! ```no_run
//! use oauth_key_bridge::{config::Config, server::BridgeServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::new("signing-secret", Some("https://bridge.example.com".into()));
//!     BridgeServer::new(config).run_http(8000).await
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod tools;

pub use client::UpstreamClient;
pub use config::Config;
pub use error::{ClientError, OAuthError, TokenError, ToolError};
