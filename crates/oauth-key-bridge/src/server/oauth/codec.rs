//! Signed, expiring claim sets.
//!
//! Both authorization codes and access tokens are HS256 JWTs produced here.
//! Encoding and decoding are pure: no shared state, safe to run in parallel.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::types::{Claims, TokenKind};
use crate::error::TokenError;

/// Encoder/decoder bound to one signing secret and algorithm.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
}

impl TokenCodec {
    /// Create an HS256 codec from a shared secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        Self::with_algorithm(secret, Algorithm::HS256)
    }

    /// Create a codec for a symmetric (HMAC) algorithm.
    ///
    /// Expiry is checked with zero leeway; `exp` is mandatory.
    #[must_use]
    pub fn with_algorithm(secret: &[u8], algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            header: Header::new(algorithm),
            validation,
        }
    }

    /// Sign a claim set.
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&self.header, claims, &self.encoding_key)
            .map_err(|e| TokenError::Encode { reason: e.to_string() })
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::ExpiredSignature,
                ErrorKind::InvalidSignature => TokenError::invalid("signature verification failed"),
                ErrorKind::InvalidToken => TokenError::invalid("token format is invalid"),
                _ => TokenError::invalid(e.to_string()),
            })
    }

    /// Decode and require the claims to be of `kind`.
    ///
    /// A well-signed token of the other kind is rejected as invalid.
    pub fn decode_as(&self, token: &str, kind: TokenKind) -> Result<Claims, TokenError> {
        let claims = self.decode(token)?;
        if claims.kind != kind {
            return Err(TokenError::invalid(format!(
                "expected {}, got {}",
                kind.as_str(),
                claims.kind.as_str()
            )));
        }
        Ok(claims)
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec").field("algorithm", &self.header.alg).finish()
    }
}

/// First characters of a token, safe to log.
#[must_use]
pub fn token_preview(token: &str) -> &str {
    let end = token.char_indices().nth(20).map_or(token.len(), |(i, _)| i);
    &token[..end]
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"unit-test-secret")
    }

    #[test]
    fn test_roundtrip_code_claims() {
        let claims = Claims::authorization_code("sk-123", "https://app.example.com/cb");
        let token = codec().encode(&claims).unwrap();

        let decoded = codec().decode(&token).unwrap();
        assert_eq!(decoded, claims);
    }

    #[test]
    fn test_expired_claims_rejected() {
        let claims = Claims { exp: Utc::now().timestamp() - 1, ..Claims::access_token("k") };
        let token = codec().encode(&claims).unwrap();

        assert_eq!(codec().decode(&token), Err(TokenError::ExpiredSignature));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = codec().encode(&Claims::access_token("k")).unwrap();
        let other = TokenCodec::new(b"rotated-secret");

        let err = other.decode(&token).unwrap_err();
        assert!(matches!(err, TokenError::MalformedOrInvalidSignature { .. }));
    }

    #[test]
    fn test_garbage_rejected() {
        for input in ["", "not-a-jwt", "a.b.c", "eyJhbGciOiJIUzI1NiJ9.e30."] {
            let err = codec().decode(input).unwrap_err();
            assert!(!err.is_expired(), "{input:?} should be invalid, not expired");
        }
    }

    #[test]
    fn test_decode_as_checks_kind() {
        let code = codec().encode(&Claims::authorization_code("k", "https://a/cb")).unwrap();
        let access = codec().encode(&Claims::access_token("k")).unwrap();

        assert!(codec().decode_as(&code, TokenKind::AuthorizationCode).is_ok());
        assert!(codec().decode_as(&access, TokenKind::AccessToken).is_ok());
        assert!(matches!(
            codec().decode_as(&code, TokenKind::AccessToken),
            Err(TokenError::MalformedOrInvalidSignature { .. })
        ));
        assert!(matches!(
            codec().decode_as(&access, TokenKind::AuthorizationCode),
            Err(TokenError::MalformedOrInvalidSignature { .. })
        ));
    }

    #[test]
    fn test_untagged_claims_rejected() {
        #[derive(serde::Serialize)]
        struct Untagged {
            api_key: &'static str,
            exp: i64,
        }

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &Untagged { api_key: "k", exp: Utc::now().timestamp() + 60 },
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();

        assert!(!codec().decode(&token).unwrap_err().is_expired());
    }

    #[test]
    fn test_decode_is_idempotent() {
        let token = codec().encode(&Claims::access_token("k")).unwrap();
        assert_eq!(codec().decode(&token), codec().decode(&token));
    }

    #[test]
    fn test_token_preview() {
        assert_eq!(token_preview("short"), "short");
        assert_eq!(token_preview(&"x".repeat(64)).len(), 20);
    }
}
