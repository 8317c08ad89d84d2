//! Per-request bearer validation.
//!
//! The bearer string is decoded fresh on every request. No session store is
//! consulted, so a token is accepted exactly when its signature verifies and
//! its expiry has not passed.

use super::codec::{TokenCodec, token_preview};
use super::ledger::RevocationLedger;
use super::types::{TokenKind, ValidatedCredential};
use crate::error::TokenError;

/// Decodes bearer credentials into the API key they carry.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    codec: TokenCodec,
    ledger: RevocationLedger,
}

impl TokenValidator {
    #[must_use]
    pub fn new(codec: TokenCodec, ledger: RevocationLedger) -> Self {
        Self { codec, ledger }
    }

    /// Validate a bearer string.
    ///
    /// Expired and invalid tokens both yield `None`, as does an authorization
    /// code presented as a bearer.
    pub async fn validate(&self, bearer: &str) -> Option<ValidatedCredential> {
        tracing::debug!(token_preview = %token_preview(bearer), "Loading access token");

        match self.codec.decode_as(bearer, TokenKind::AccessToken) {
            Ok(claims) => {
                let credential = ValidatedCredential::from_claims(bearer, claims);
                self.ledger.record_access_token(&credential).await;
                Some(credential)
            }
            Err(TokenError::ExpiredSignature) => {
                tracing::error!("Token expired");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Invalid token");
                None
            }
        }
    }
}
