//! Stateless OAuth 2.0 authorization server.
//!
//! Codes and access tokens are signed JWTs that carry the upstream API key as a
//! claim. The signed string is the only source of truth: the in-memory maps
//! kept here are bookkeeping and never decide validity. Rotating the signing
//! secret is the one real revocation mechanism.
//!
//! ## Supported Standards
//! - RFC 9728: OAuth Protected Resource Metadata
//! - RFC 8414: OAuth Authorization Server Metadata
//! - RFC 7591: Dynamic Client Registration
//! - RFC 6749: Authorization Code Grant
//!
//! PKCE methods are advertised for client compatibility but not enforced.

pub mod codec;
pub mod handlers;
pub mod issuer;
pub mod ledger;
pub mod login;
pub mod minter;
pub mod registry;
pub mod types;
pub mod validator;

use std::sync::Arc;

pub use codec::TokenCodec;
pub use issuer::CodeIssuer;
pub use ledger::{RevocationLedger, TokenRecord};
pub use minter::TokenMinter;
pub use registry::{ClientRegistry, RegistrationRequest};
pub use types::{AccessTokenResponse, Claims, ClientDescriptor, TokenKind, ValidatedCredential};
pub use validator::TokenValidator;

use crate::client::{HttpProbe, UpstreamProbe};
use crate::config::Config;

/// All OAuth components sharing one codec and one ledger.
#[derive(Debug, Clone)]
pub struct OAuthProvider {
    pub registry: ClientRegistry,
    pub issuer: CodeIssuer,
    pub minter: TokenMinter,
    pub validator: TokenValidator,
    pub ledger: RevocationLedger,
}

impl OAuthProvider {
    /// Build the provider with an HTTP probe against the configured URL.
    ///
    /// # Errors
    ///
    /// Returns error if the probe's HTTP client cannot be built.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let probe = HttpProbe::new(config)?;
        Ok(Self::with_probe(config, Arc::new(probe)))
    }

    /// Build the provider with a caller-supplied probe.
    #[must_use]
    pub fn with_probe(config: &Config, probe: Arc<dyn UpstreamProbe>) -> Self {
        let codec = TokenCodec::new(config.signing_secret.as_bytes());
        let ledger = RevocationLedger::new(config.ledger_capacity);

        Self {
            registry: ClientRegistry::new(),
            issuer: CodeIssuer::new(codec.clone(), probe, ledger.clone()),
            minter: TokenMinter::new(codec.clone(), ledger.clone()),
            validator: TokenValidator::new(codec, ledger.clone()),
            ledger,
        }
    }
}
