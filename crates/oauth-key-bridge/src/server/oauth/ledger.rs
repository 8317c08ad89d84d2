//! Best-effort bookkeeping of issued codes and observed access tokens.
//!
//! Entries here never decide whether a token is valid. Validity is carried by
//! the signature and expiry alone, so [`RevocationLedger::revoke`] only drops the
//! cache entry. A revoked token keeps decoding until it expires or the signing
//! secret changes. Real revocation would need a denylist consulted inside the
//! validator.
//!
//! Entries hold metadata only. The API key stays sealed in the token.

use moka::future::Cache;

use super::types::{Claims, TokenKind, ValidatedCredential};

/// Metadata kept for a code or token the server has seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub kind: TokenKind,
    pub expires_at: i64,
    pub scopes: Vec<String>,
}

/// Bounded caches of codes and tokens the server has seen.
#[derive(Clone)]
pub struct RevocationLedger {
    auth_codes: Cache<String, TokenRecord>,
    access_tokens: Cache<String, TokenRecord>,
}

impl RevocationLedger {
    /// Create a ledger holding at most `capacity` entries per cache.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            auth_codes: Cache::builder().max_capacity(capacity).build(),
            access_tokens: Cache::builder().max_capacity(capacity).build(),
        }
    }

    /// Note an authorization code that was just issued.
    pub async fn record_code(&self, code: &str, claims: &Claims) {
        let record = TokenRecord { kind: claims.kind, expires_at: claims.exp, scopes: Vec::new() };
        self.auth_codes.insert(code.to_owned(), record).await;
    }

    /// Note an access token that was minted or validated.
    pub async fn record_access_token(&self, credential: &ValidatedCredential) {
        let record = TokenRecord {
            kind: TokenKind::AccessToken,
            expires_at: credential.expires_at,
            scopes: credential.scopes.clone(),
        };
        self.access_tokens.insert(credential.token.clone(), record).await;
    }

    /// Cached metadata for an access token.
    pub async fn access_token_record(&self, token: &str) -> Option<TokenRecord> {
        self.access_tokens.get(token).await
    }

    /// Whether an access token is currently cached.
    #[must_use]
    pub fn is_tracked(&self, token: &str) -> bool {
        self.access_tokens.contains_key(token)
    }

    /// Whether an authorization code is currently cached.
    #[must_use]
    pub fn is_code_tracked(&self, code: &str) -> bool {
        self.auth_codes.contains_key(code)
    }

    /// Drop the cached entry for `token`. Returns whether one existed.
    ///
    /// Does not make the token undecodable.
    pub async fn revoke(&self, token: &str) -> bool {
        let removed = self.access_tokens.remove(token).await.is_some();
        if removed {
            tracing::info!("Token revoked");
        }
        removed
    }
}

impl std::fmt::Debug for RevocationLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationLedger")
            .field("auth_codes", &self.auth_codes.entry_count())
            .field("access_tokens", &self.access_tokens.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_revoke_removes_entry() {
        let ledger = RevocationLedger::new(16);
        let credential = ValidatedCredential::from_claims("tok-1", Claims::access_token("k"));

        ledger.record_access_token(&credential).await;
        assert!(ledger.is_tracked("tok-1"));

        assert!(ledger.revoke("tok-1").await);
        assert!(!ledger.is_tracked("tok-1"));
        assert!(!ledger.revoke("tok-1").await);
    }

    #[tokio::test]
    async fn test_record_code() {
        let ledger = RevocationLedger::new(16);
        ledger.record_code("code-1", &Claims::authorization_code("k", "https://a/cb")).await;
        assert!(ledger.is_code_tracked("code-1"));
        assert!(!ledger.is_code_tracked("code-2"));
    }

    #[tokio::test]
    async fn test_records_hold_no_api_key() {
        let ledger = RevocationLedger::new(16);
        let claims = Claims::access_token("sk-never-cached");
        let expires_at = claims.exp;
        ledger.record_access_token(&ValidatedCredential::from_claims("tok-2", claims)).await;

        let record = ledger.access_token_record("tok-2").await.unwrap();
        assert_eq!(record.kind, TokenKind::AccessToken);
        assert_eq!(record.expires_at, expires_at);
        assert_eq!(record.scopes, vec!["api:read".to_string()]);
        assert!(!format!("{record:?}").contains("sk-never-cached"));
    }
}
