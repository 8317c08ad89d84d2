//! OAuth 2.0 endpoint handlers.
//!
//! Implements:
//! - RFC 9728: OAuth Protected Resource Metadata
//! - RFC 8414: OAuth Authorization Server Metadata
//! - RFC 7591: Dynamic Client Registration
//! - RFC 6749: OAuth 2.0 Authorization Code Grant

use std::sync::Arc;

use axum::{
    Form, Json,
    body::Bytes,
    extract::{Query, State, rejection::FormRejection},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use super::login::render_api_key_form;
use super::registry::RegistrationRequest;
use super::types::{AccessTokenResponse, AuthorizationParams};
use crate::config::oauth::{DEFAULT_CLIENT_ID, SUPPORTED_SCOPES};
use crate::error::OAuthError;
use crate::server::transport::HttpState;

// ─── RFC 9728: Protected Resource Metadata ───────────────────────────────────

/// `GET /.well-known/oauth-protected-resource`
///
/// Tells clients where to find the authorization server for this resource.
pub async fn handle_protected_resource(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "resource": state.config.endpoint("/mcp"),
        "authorization_servers": [state.config.issuer_url],
        "scopes_supported": SUPPORTED_SCOPES,
        "bearer_methods_supported": ["header"]
    }))
}

// ─── RFC 8414: Authorization Server Metadata ─────────────────────────────────

/// `GET /.well-known/oauth-authorization-server`
///
/// Describes the OAuth endpoints and capabilities.
pub async fn handle_auth_server_metadata(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "issuer": state.config.issuer_url,
        "authorization_endpoint": state.config.endpoint("/authorize"),
        "token_endpoint": state.config.endpoint("/token"),
        "registration_endpoint": state.config.endpoint("/register"),
        "scopes_supported": SUPPORTED_SCOPES,
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code", "refresh_token"],
        "token_endpoint_auth_methods_supported": ["none", "client_secret_post"],
        "code_challenge_methods_supported": ["plain", "S256"]
    }))
}

// ─── RFC 7591: Dynamic Client Registration ───────────────────────────────────

/// `POST /register`
///
/// Register a new OAuth client dynamically. The body is parsed here rather
/// than by an extractor so every malformed body maps to `invalid_client_metadata`.
pub async fn handle_register(State(state): State<Arc<HttpState>>, body: Bytes) -> Response {
    tracing::debug!(bytes = body.len(), "Client registration request");

    let request = match RegistrationRequest::from_json(&body) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(error = %e, "Client registration error");
            return e.into_response();
        }
    };

    let client = state.oauth.registry.register(request).await;

    (StatusCode::CREATED, Json(client)).into_response()
}

// ─── Authorization Endpoint ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub response_type: Option<String>,
    pub state: Option<String>,
    pub scope: Option<String>,
}

/// `GET /authorize`
///
/// Show the API key form. Registered clients have their redirect URI and
/// response type checked first; unknown client ids (including the `default`
/// client) are shown the form as-is.
pub async fn handle_authorize_get(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<AuthorizeQuery>,
) -> Response {
    let Some(redirect_uri) = query.redirect_uri else {
        return OAuthError::InvalidRequest("Missing redirect_uri".into()).into_response();
    };
    let client_id = query.client_id.unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string());

    tracing::info!(client_id = %client_id, redirect_uri = %redirect_uri, "Authorization request");

    let params = AuthorizationParams {
        redirect_uri,
        response_type: query.response_type,
        state: query.state,
        scope: query.scope,
    };

    let client_name = match state.oauth.registry.lookup(&client_id).await {
        Some(client) => match state.oauth.issuer.begin_authorization(&client, &params) {
            Ok(pending) => pending.client_name,
            Err(e) => return e.into_response(),
        },
        None => client_id.clone(),
    };

    Html(render_api_key_form(
        &client_name,
        &client_id,
        &params.redirect_uri,
        params.state.as_deref(),
        None,
    ))
    .into_response()
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeForm {
    pub api_key: Option<String>,
    pub redirect_uri: Option<String>,
    pub client_id: Option<String>,
    pub state: Option<String>,
}

/// `POST /authorize`
///
/// Accept the submitted API key and redirect back to the client with a code.
pub async fn handle_authorize_post(
    State(state): State<Arc<HttpState>>,
    form: Result<Form<AuthorizeForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(e) => return OAuthError::InvalidRequest(e.body_text()).into_response(),
    };

    let Some(redirect_uri) = form.redirect_uri else {
        return OAuthError::InvalidRequest("Missing redirect_uri".into()).into_response();
    };
    let client_id = form.client_id.unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string());

    let registered = state.oauth.registry.lookup(&client_id).await;
    if let Some(ref client) = registered {
        if !client.allows_redirect(&redirect_uri) {
            return OAuthError::InvalidRedirectUri(
                "redirect_uri not registered for this client".into(),
            )
            .into_response();
        }
    }

    let api_key = form.api_key.unwrap_or_default();
    if api_key.trim().is_empty() {
        let client_name = registered.map_or_else(|| client_id.clone(), |c| c.client_name);
        let html = render_api_key_form(
            &client_name,
            &client_id,
            &redirect_uri,
            form.state.as_deref(),
            Some("API key is required"),
        );
        return (StatusCode::BAD_REQUEST, Html(html)).into_response();
    }

    match state
        .oauth
        .issuer
        .complete_authorization(api_key.trim(), &redirect_uri, &client_id, form.state.as_deref())
        .await
    {
        Ok(location) => (StatusCode::FOUND, [(header::LOCATION, location)]).into_response(),
        Err(e) => e.into_response(),
    }
}

// ─── Token Endpoint ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub grant_type: Option<String>,
    pub code: Option<String>,
    pub redirect_uri: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub refresh_token: Option<String>,
}

/// `POST /token`
///
/// Exchange an authorization code for an access token.
pub async fn handle_token(
    State(state): State<Arc<HttpState>>,
    form: Result<Form<TokenRequest>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(e) => return OAuthError::InvalidRequest(e.body_text()).into_response(),
    };

    tracing::info!(
        grant_type = form.grant_type.as_deref().unwrap_or("-"),
        client_id = form.client_id.as_deref().unwrap_or("-"),
        "Token exchange"
    );

    let result = match form.grant_type.as_deref() {
        Some("authorization_code") => {
            let Some(ref code) = form.code else {
                return OAuthError::InvalidRequest("Missing code".into()).into_response();
            };
            state
                .oauth
                .minter
                .exchange_code(form.client_id.as_deref(), code, form.redirect_uri.as_deref())
                .await
        }
        Some("refresh_token") => {
            state.oauth.minter.exchange_refresh_token(form.refresh_token.as_deref()).await
        }
        other => Err(OAuthError::UnsupportedGrantType(format!(
            "grant_type {:?} is not supported",
            other.unwrap_or_default()
        ))),
    };

    match result {
        Ok(token) => token_success(&token),
        Err(e) => e.into_response(),
    }
}

/// Build a token response with required OAuth 2.0 cache headers (RFC 6749 §5.1).
fn token_success(token: &AccessTokenResponse) -> Response {
    let mut response = Json(token).into_response();

    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}
