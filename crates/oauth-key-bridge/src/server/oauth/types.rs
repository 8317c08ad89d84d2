//! OAuth 2.0 types for the key bridge.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::oauth::{ACCESS_TOKEN_LIFETIME, AUTH_CODE_LIFETIME, DEFAULT_SCOPES};

/// A dynamically registered OAuth client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientDescriptor {
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub client_name: String,
    pub redirect_uris: Vec<String>,
    pub grant_types: Vec<String>,
    pub response_types: Vec<String>,
    pub token_endpoint_auth_method: String,
}

impl ClientDescriptor {
    /// Whether `redirect_uri` may receive codes for this client.
    ///
    /// A client that registered no redirect URIs accepts any.
    #[must_use]
    pub fn allows_redirect(&self, redirect_uri: &str) -> bool {
        self.redirect_uris.is_empty() || self.redirect_uris.iter().any(|u| u == redirect_uri)
    }
}

/// The two kinds of signed string the server hands out.
///
/// Sealed into every token as the `kind` claim so a code is never accepted
/// as a bearer and a bearer is never exchanged as a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    AuthorizationCode,
    AccessToken,
}

impl TokenKind {
    /// Human-readable name for log and error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization code",
            Self::AccessToken => "access token",
        }
    }

    /// Validity window from issuance.
    #[must_use]
    pub const fn lifetime(self) -> Duration {
        match self {
            Self::AuthorizationCode => AUTH_CODE_LIFETIME,
            Self::AccessToken => ACCESS_TOKEN_LIFETIME,
        }
    }
}

/// Claim set carried inside every code and access token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Upstream API key, carried opaquely.
    pub api_key: String,

    /// Redirect URI the code was issued for. Absent on access tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,

    /// Which kind of token this claim set belongs to.
    pub kind: TokenKind,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
}

impl Claims {
    /// Claims for a fresh authorization code.
    #[must_use]
    pub fn authorization_code(api_key: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            redirect_uri: Some(redirect_uri.into()),
            kind: TokenKind::AuthorizationCode,
            exp: expiry_from_now(TokenKind::AuthorizationCode),
        }
    }

    /// Claims for a fresh access token.
    #[must_use]
    pub fn access_token(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            redirect_uri: None,
            kind: TokenKind::AccessToken,
            exp: expiry_from_now(TokenKind::AccessToken),
        }
    }

    /// Seconds until expiry, clamped at zero.
    #[must_use]
    pub fn expires_in(&self) -> u64 {
        (self.exp - Utc::now().timestamp()).max(0) as u64
    }
}

impl std::fmt::Debug for Claims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Claims")
            .field("kind", &self.kind)
            .field("redirect_uri", &self.redirect_uri)
            .field("exp", &self.exp)
            .finish()
    }
}

fn expiry_from_now(kind: TokenKind) -> i64 {
    Utc::now().timestamp() + kind.lifetime().as_secs() as i64
}

/// Authorization request parameters from the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorizationParams {
    pub redirect_uri: String,
    pub response_type: Option<String>,
    pub state: Option<String>,
    pub scope: Option<String>,
}

/// An authorization request waiting for a human to submit an API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAuthorization {
    pub client_id: String,
    pub client_name: String,
    pub redirect_uri: String,
    pub state: Option<String>,
}

/// A bearer credential accepted by the validator.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidatedCredential {
    pub token: String,
    pub client_id: String,
    pub scopes: Vec<String>,
    pub expires_at: i64,
    pub api_key: String,
}

impl ValidatedCredential {
    /// Build a credential from decoded access-token claims.
    #[must_use]
    pub fn from_claims(token: impl Into<String>, claims: Claims) -> Self {
        Self {
            token: token.into(),
            client_id: crate::config::oauth::DEFAULT_CLIENT_ID.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| (*s).to_string()).collect(),
            expires_at: claims.exp,
            api_key: claims.api_key,
        }
    }
}

impl std::fmt::Debug for ValidatedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatedCredential")
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Successful token endpoint payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_claims_expire_in_five_minutes() {
        let claims = Claims::authorization_code("key", "https://app.example.com/cb");
        let remaining = claims.expires_in();
        assert!((299..=300).contains(&remaining));
        assert_eq!(claims.redirect_uri.as_deref(), Some("https://app.example.com/cb"));
    }

    #[test]
    fn test_expires_in_clamped_at_zero() {
        let claims = Claims { exp: 0, ..Claims::access_token("k") };
        assert_eq!(claims.expires_in(), 0);
    }

    #[test]
    fn test_access_claims_omit_redirect_uri() {
        let json = serde_json::to_value(Claims::access_token("k")).unwrap();
        assert!(json.get("redirect_uri").is_none());
        assert_eq!(json["kind"], "access_token");
    }

    #[test]
    fn test_code_claims_tagged() {
        let json = serde_json::to_value(Claims::authorization_code("k", "https://a/cb")).unwrap();
        assert_eq!(json["kind"], "authorization_code");
    }

    #[test]
    fn test_debug_never_prints_api_key() {
        let claims = Claims::access_token("sk-live-123");
        let credential = ValidatedCredential::from_claims("tok", claims.clone());
        assert!(!format!("{claims:?}").contains("sk-live-123"));
        assert!(!format!("{credential:?}").contains("sk-live-123"));
        assert_eq!(credential.scopes, vec!["api:read".to_string()]);
    }

    #[test]
    fn test_redirect_allowed() {
        let client = ClientDescriptor {
            client_id: "c".into(),
            client_secret: None,
            client_name: "n".into(),
            redirect_uris: vec!["https://a.example/cb".into()],
            grant_types: vec![],
            response_types: vec![],
            token_endpoint_auth_method: "none".into(),
        };
        assert!(client.allows_redirect("https://a.example/cb"));
        assert!(!client.allows_redirect("https://evil.example/cb"));
    }
}
