//! Credential storage.
//!
//! The session layer consumes a [`CredentialStore`]; it never implements
//! secure storage itself. A store holds one access/refresh pair per identity
//! and must replace a pair atomically: readers see either the old pair or the
//! new one, never a mix.

use async_trait::async_trait;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::BearerToken;

/// Errors emitted by credential stores.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum CredentialStoreError {
    /// Filesystem or I/O error
    #[error("I/O error: {0}")]
    #[diagnostic(code(atkit::credential_store::io))]
    Io(#[from] std::io::Error),
    /// Serialization error (e.g., JSON)
    #[error("serialization error: {0}")]
    #[diagnostic(code(atkit::credential_store::serde))]
    Serde(#[from] serde_json::Error),
    /// Any other error from a backend implementation
    #[error(transparent)]
    #[diagnostic(code(atkit::credential_store::other))]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

/// An access/refresh token pair for one identity.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// Short-lived token attached to ordinary calls
    pub access_jwt: SmolStr,
    /// Long-lived token used only to mint a new pair
    pub refresh_jwt: SmolStr,
}

impl Credentials {
    /// Build a pair from raw tokens.
    pub fn new(access_jwt: impl Into<SmolStr>, refresh_jwt: impl Into<SmolStr>) -> Self {
        Self {
            access_jwt: access_jwt.into(),
            refresh_jwt: refresh_jwt.into(),
        }
    }

    /// The access token as a bearer credential.
    pub fn access(&self) -> BearerToken {
        BearerToken::new(self.access_jwt.clone())
    }

    /// The refresh token as a bearer credential.
    pub fn refresh(&self) -> BearerToken {
        BearerToken::new(self.refresh_jwt.clone())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_jwt", &"<redacted>")
            .field("refresh_jwt", &"<redacted>")
            .finish()
    }
}

/// Pluggable storage for credential pairs, keyed by account identifier.
///
/// A missing entry is `Ok(None)`; a backend that cannot be read is an error,
/// never an absent entry.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Get the current pair for `did`, if present.
    async fn get(&self, did: &str) -> Result<Option<Credentials>, CredentialStoreError>;
    /// Replace the pair for `did` in a single step.
    async fn set(&self, did: &str, credentials: Credentials) -> Result<(), CredentialStoreError>;
    /// Delete the pair for `did`. Deleting a missing entry is not an error.
    async fn del(&self, did: &str) -> Result<(), CredentialStoreError>;

    /// Current access token for `did`.
    async fn access_token(&self, did: &str) -> Result<Option<BearerToken>, CredentialStoreError> {
        Ok(self.get(did).await?.map(|c| c.access()))
    }

    /// Current refresh token for `did`.
    async fn refresh_token(&self, did: &str) -> Result<Option<BearerToken>, CredentialStoreError> {
        Ok(self.get(did).await?.map(|c| c.refresh()))
    }
}

#[async_trait]
impl<S: CredentialStore + ?Sized> CredentialStore for Arc<S> {
    async fn get(&self, did: &str) -> Result<Option<Credentials>, CredentialStoreError> {
        self.as_ref().get(did).await
    }
    async fn set(&self, did: &str, credentials: Credentials) -> Result<(), CredentialStoreError> {
        self.as_ref().set(did, credentials).await
    }
    async fn del(&self, did: &str) -> Result<(), CredentialStoreError> {
        self.as_ref().del(did).await
    }
}

/// In-memory credential store suitable for short-lived sessions and tests.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore(Arc<RwLock<HashMap<SmolStr, Credentials>>>);

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, did: &str) -> Result<Option<Credentials>, CredentialStoreError> {
        Ok(self.0.read().await.get(did).cloned())
    }
    async fn set(&self, did: &str, credentials: Credentials) -> Result<(), CredentialStoreError> {
        self.0.write().await.insert(SmolStr::new(did), credentials);
        Ok(())
    }
    async fn del(&self, did: &str) -> Result<(), CredentialStoreError> {
        self.0.write().await.remove(did);
        Ok(())
    }
}
