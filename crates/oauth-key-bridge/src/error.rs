//! Error types for the OAuth key bridge.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Errors from decoding or encoding a signed token.
///
/// Callers never see these directly: the validator maps both decode faults
/// to an absent credential and the token endpoint maps them to `invalid_grant`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The signature verified but the embedded expiry has passed.
    #[error("token expired")]
    ExpiredSignature,

    /// Structurally invalid, wrong signature, or any other decode fault.
    #[error("malformed or invalid token: {reason}")]
    MalformedOrInvalidSignature {
        /// What the decoder rejected
        reason: String,
    },

    /// Claims could not be signed.
    #[error("failed to encode token: {reason}")]
    Encode {
        /// Underlying encoder message
        reason: String,
    },
}

impl TokenError {
    /// Create a malformed-or-invalid error.
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::MalformedOrInvalidSignature { reason: reason.into() }
    }

    /// Returns true if the token failed only because it expired.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self, Self::ExpiredSignature)
    }
}

/// OAuth 2.0 protocol errors surfaced to clients (RFC 6749 §5.2, RFC 7591 §3.2.2).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OAuthError {
    /// Registration body could not be parsed or contained bad values.
    #[error("invalid_client_metadata: {0}")]
    InvalidClientMetadata(String),

    /// A required parameter is missing or malformed.
    #[error("invalid_request: {0}")]
    InvalidRequest(String),

    /// Authorization code is expired, tampered with, or mismatched.
    #[error("invalid_grant: {0}")]
    InvalidGrant(String),

    /// Grant type other than `authorization_code`.
    #[error("unsupported_grant_type: {0}")]
    UnsupportedGrantType(String),

    /// Response type other than `code`.
    #[error("unsupported_response_type: {0}")]
    UnsupportedResponseType(String),

    /// Redirect URI not registered for the client or not a valid URL.
    #[error("invalid_redirect_uri: {0}")]
    InvalidRedirectUri(String),

    /// Unexpected internal failure (e.g. signing).
    #[error("server_error: {0}")]
    ServerError(String),
}

impl OAuthError {
    /// RFC 6749 error code string.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidClientMetadata(_) => "invalid_client_metadata",
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidGrant(_) => "invalid_grant",
            Self::UnsupportedGrantType(_) => "unsupported_grant_type",
            Self::UnsupportedResponseType(_) => "unsupported_response_type",
            Self::InvalidRedirectUri(_) => "invalid_redirect_uri",
            Self::ServerError(_) => "server_error",
        }
    }

    /// Human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::InvalidClientMetadata(d)
            | Self::InvalidRequest(d)
            | Self::InvalidGrant(d)
            | Self::UnsupportedGrantType(d)
            | Self::UnsupportedResponseType(d)
            | Self::InvalidRedirectUri(d)
            | Self::ServerError(d) => d,
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<TokenError> for OAuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::ExpiredSignature => Self::InvalidGrant("authorization code expired".into()),
            TokenError::MalformedOrInvalidSignature { .. } => {
                Self::InvalidGrant("invalid authorization code".into())
            }
            TokenError::Encode { reason } => Self::ServerError(reason),
        }
    }
}

impl From<RegistryError> for OAuthError {
    fn from(err: RegistryError) -> Self {
        Self::InvalidClientMetadata(err.to_string())
    }
}

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(serde_json::json!({
                "error": self.error_code(),
                "error_description": self.description()
            })),
        )
            .into_response()
    }
}

/// Errors from the client registry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A caller-supplied client id is already registered.
    #[error("client_id already registered: {0}")]
    ClientIdConflict(String),
}

/// Errors from the upstream HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Upstream rejected the API key (401/403 response)
    #[error("Upstream rejected credentials ({status})")]
    Unauthorized {
        /// HTTP status code
        status: u16,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }
}

/// Errors from MCP tool execution.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// Error from the upstream client
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// No API key could be recovered from the request credential
    #[error("No API key found")]
    Unauthenticated,

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Convert to a user-friendly error message for MCP response.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Client(ClientError::Unauthorized { .. }) => {
                "Upstream service rejected the API key. Re-authorize to supply a new one.".into()
            }
            Self::Client(ClientError::Timeout(after)) => {
                format!("Upstream service did not answer within {after:?}.")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_faults_collapse_to_invalid_grant() {
        let expired: OAuthError = TokenError::ExpiredSignature.into();
        let tampered: OAuthError = TokenError::invalid("InvalidSignature").into();

        assert_eq!(expired.error_code(), "invalid_grant");
        assert_eq!(tampered.error_code(), "invalid_grant");
        assert_eq!(expired.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_encode_failure_is_server_error() {
        let err: OAuthError = TokenError::Encode { reason: "boom".into() }.into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.description(), "boom");
    }

    #[test]
    fn test_registry_conflict_maps_to_client_metadata() {
        let err: OAuthError = RegistryError::ClientIdConflict("abc".into()).into();
        assert_eq!(err.error_code(), "invalid_client_metadata");
        assert!(err.description().contains("abc"));
    }

    #[test]
    fn test_tool_error_user_message() {
        let err = ToolError::Client(ClientError::Unauthorized { status: 401 });
        assert!(err.to_user_message().contains("rejected the API key"));
        assert_eq!(ToolError::Unauthenticated.to_user_message(), "No API key found");
    }
}
