//! Authorization code to access token exchange.

use super::codec::{TokenCodec, token_preview};
use super::ledger::RevocationLedger;
use super::types::{AccessTokenResponse, Claims, TokenKind, ValidatedCredential};
use crate::error::{OAuthError, TokenError};

/// Mints long-lived access tokens from authorization codes.
#[derive(Debug, Clone)]
pub struct TokenMinter {
    codec: TokenCodec,
    ledger: RevocationLedger,
}

impl TokenMinter {
    #[must_use]
    pub fn new(codec: TokenCodec, ledger: RevocationLedger) -> Self {
        Self { codec, ledger }
    }

    /// Exchange an authorization code for an access token.
    ///
    /// Codes are not single-use: replaying a code inside its five-minute window
    /// mints another token. When `redirect_uri` is given it must match the one
    /// embedded in the code.
    pub async fn exchange_code(
        &self,
        client_id: Option<&str>,
        code: &str,
        redirect_uri: Option<&str>,
    ) -> Result<AccessTokenResponse, OAuthError> {
        tracing::info!(
            client_id = client_id.unwrap_or("-"),
            code_preview = %token_preview(code),
            "Exchanging auth code"
        );

        let claims = self.codec.decode_as(code, TokenKind::AuthorizationCode).map_err(|e| {
            match &e {
                TokenError::ExpiredSignature => tracing::error!("Auth code expired"),
                other => tracing::error!(error = %other, "Error exchanging token"),
            }
            OAuthError::from(e)
        })?;

        if let Some(redirect_uri) = redirect_uri {
            if claims.redirect_uri.as_deref() != Some(redirect_uri) {
                return Err(OAuthError::InvalidGrant("redirect_uri mismatch".into()));
            }
        }

        let access = Claims::access_token(claims.api_key);
        let access_token = self.codec.encode(&access)?;
        let expires_in = access.expires_in();

        self.ledger
            .record_access_token(&ValidatedCredential::from_claims(access_token.clone(), access))
            .await;

        tracing::info!("Generated access token");

        Ok(AccessTokenResponse { access_token, token_type: "bearer".to_string(), expires_in })
    }

    /// Refresh tokens are never issued, so this always fails.
    pub async fn exchange_refresh_token(
        &self,
        _refresh_token: Option<&str>,
    ) -> Result<AccessTokenResponse, OAuthError> {
        Err(OAuthError::UnsupportedGrantType("refresh tokens are not supported".into()))
    }
}
