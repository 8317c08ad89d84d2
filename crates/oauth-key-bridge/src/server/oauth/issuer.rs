//! Authorization leg: request, human API-key submission, code issuance.
//!
//! ```text
//! AuthorizationRequested --begin_authorization--> (form shown)
//!     --complete_authorization--> HumanCredentialSubmitted --encode--> CodeIssued
//! ```
//!
//! The probe of the submitted key is fail-open: a failure is logged and the
//! code is issued anyway.

use std::sync::Arc;

use url::Url;

use super::codec::{TokenCodec, token_preview};
use super::ledger::RevocationLedger;
use super::types::{AuthorizationParams, Claims, ClientDescriptor, PendingAuthorization};
use crate::client::UpstreamProbe;
use crate::error::OAuthError;

/// Issues authorization codes that embed the submitted API key.
#[derive(Clone)]
pub struct CodeIssuer {
    codec: TokenCodec,
    probe: Arc<dyn UpstreamProbe>,
    ledger: RevocationLedger,
}

impl CodeIssuer {
    #[must_use]
    pub fn new(codec: TokenCodec, probe: Arc<dyn UpstreamProbe>, ledger: RevocationLedger) -> Self {
        Self { codec, probe, ledger }
    }

    /// Accept an authorization request for a registered client.
    ///
    /// No code is issued here: the request waits for a human to submit an
    /// API key through the form.
    pub fn begin_authorization(
        &self,
        client: &ClientDescriptor,
        params: &AuthorizationParams,
    ) -> Result<PendingAuthorization, OAuthError> {
        tracing::info!(
            client_id = %client.client_id,
            redirect_uri = %params.redirect_uri,
            "Authorizing client"
        );

        if let Some(response_type) = params.response_type.as_deref() {
            if response_type != "code" {
                return Err(OAuthError::UnsupportedResponseType(format!(
                    "response_type must be 'code', got {response_type:?}"
                )));
            }
        }

        if !client.allows_redirect(&params.redirect_uri) {
            return Err(OAuthError::InvalidRedirectUri(
                "redirect_uri not registered for this client".into(),
            ));
        }

        Ok(PendingAuthorization {
            client_id: client.client_id.clone(),
            client_name: client.client_name.clone(),
            redirect_uri: params.redirect_uri.clone(),
            state: params.state.clone(),
        })
    }

    /// Turn a submitted API key into a redirect carrying a fresh code.
    ///
    /// Returns the full redirect URL (`redirect_uri?code=...[&state=...]`).
    pub async fn complete_authorization(
        &self,
        api_key: &str,
        redirect_uri: &str,
        client_id: &str,
        state: Option<&str>,
    ) -> Result<String, OAuthError> {
        tracing::info!(
            client_id = %client_id,
            redirect_uri = %redirect_uri,
            "Authorization submitted"
        );

        match self.probe.probe(api_key).await {
            Ok(()) => tracing::info!("API key validation successful"),
            Err(e) => tracing::warn!(error = %e, "API key validation failed (allowing through)"),
        }

        let claims = Claims::authorization_code(api_key, redirect_uri);
        let code = self.codec.encode(&claims)?;
        self.ledger.record_code(&code, &claims).await;

        tracing::info!(
            code_preview = %token_preview(&code),
            redirect_uri = %redirect_uri,
            "Generated auth code"
        );

        Ok(redirect_with_code(redirect_uri, &code, state))
    }
}

impl std::fmt::Debug for CodeIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeIssuer").field("codec", &self.codec).finish()
    }
}

/// Append `code` (and `state`) to a redirect URI, keeping any existing query.
fn redirect_with_code(redirect_uri: &str, code: &str, state: Option<&str>) -> String {
    if let Ok(mut url) = Url::parse(redirect_uri) {
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("code", code);
            if let Some(state) = state {
                pairs.append_pair("state", state);
            }
        }
        return url.into();
    }

    // Not an absolute URL: fall back to plain concatenation.
    let mut redirect = redirect_uri.to_owned();
    redirect.push(if redirect.contains('?') { '&' } else { '?' });
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query.append_pair("code", code);
    if let Some(state) = state {
        query.append_pair("state", state);
    }
    redirect.push_str(&query.finish());
    redirect
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_with_code() {
        assert_eq!(
            redirect_with_code("https://app.example.com/cb", "abc.def", None),
            "https://app.example.com/cb?code=abc.def"
        );
        assert_eq!(
            redirect_with_code("https://app.example.com/cb?x=1", "c", Some("s t")),
            "https://app.example.com/cb?x=1&code=c&state=s+t"
        );
        assert_eq!(redirect_with_code("/relative", "c", None), "/relative?code=c");
    }
}
