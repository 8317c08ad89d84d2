//! In-memory directory of registered OAuth clients.
//!
//! Lives as long as the process. Nothing is persisted.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::RwLock;

use super::types::ClientDescriptor;
use crate::config::oauth::DEFAULT_CLIENT_NAME;
use crate::error::{OAuthError, RegistryError};

/// RFC 7591 registration body. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationRequest {
    pub client_name: Option<String>,
    pub redirect_uris: Option<Vec<String>>,
    pub grant_types: Option<Vec<String>>,
    pub response_types: Option<Vec<String>>,
    pub token_endpoint_auth_method: Option<String>,
}

impl RegistrationRequest {
    /// Parse a raw registration body.
    pub fn from_json(body: &[u8]) -> Result<Self, OAuthError> {
        let request: Self = serde_json::from_slice(body)
            .map_err(|e| OAuthError::InvalidClientMetadata(format!("Invalid client metadata: {e}")))?;

        for uri in request.redirect_uris.iter().flatten() {
            url::Url::parse(uri).map_err(|e| {
                OAuthError::InvalidClientMetadata(format!("Invalid redirect_uri {uri:?}: {e}"))
            })?;
        }

        Ok(request)
    }
}

/// Concurrent-safe client directory.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<RwLock<HashMap<String, ClientDescriptor>>>,
}

impl ClientRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client under a freshly generated id and secret.
    pub async fn register(&self, request: RegistrationRequest) -> ClientDescriptor {
        let descriptor = ClientDescriptor {
            client_id: format!("client_{}", &uuid::Uuid::new_v4().simple().to_string()[..16]),
            client_secret: Some(uuid::Uuid::new_v4().simple().to_string()),
            client_name: request.client_name.unwrap_or_else(|| DEFAULT_CLIENT_NAME.to_string()),
            redirect_uris: request.redirect_uris.unwrap_or_default(),
            grant_types: request
                .grant_types
                .unwrap_or_else(|| vec!["authorization_code".to_string()]),
            response_types: request.response_types.unwrap_or_else(|| vec!["code".to_string()]),
            token_endpoint_auth_method: request
                .token_endpoint_auth_method
                .unwrap_or_else(|| "none".to_string()),
        };

        tracing::info!(client_id = %descriptor.client_id, "Registering client");

        self.clients.write().await.insert(descriptor.client_id.clone(), descriptor.clone());
        descriptor
    }

    /// Store a descriptor whose id was chosen by the caller.
    ///
    /// Fails instead of overwriting when the id is taken.
    pub async fn insert(&self, descriptor: ClientDescriptor) -> Result<(), RegistryError> {
        match self.clients.write().await.entry(descriptor.client_id.clone()) {
            Entry::Occupied(_) => Err(RegistryError::ClientIdConflict(descriptor.client_id)),
            Entry::Vacant(slot) => {
                tracing::info!(client_id = %descriptor.client_id, "Registering client");
                slot.insert(descriptor);
                Ok(())
            }
        }
    }

    /// Look up a client by ID.
    pub async fn lookup(&self, client_id: &str) -> Option<ClientDescriptor> {
        tracing::debug!(client_id = %client_id, "Getting client");
        self.clients.read().await.get(client_id).cloned()
    }

    /// Number of registered clients.
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Whether no client is registered.
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry").finish()
    }
}
