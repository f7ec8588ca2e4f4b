use std::sync::Arc;

use atkit_api::com_atproto::server::{
    create_session::CreateSession, pds_endpoint, refresh_session::RefreshSession,
};
use atkit_common::{
    BearerToken,
    error::{ClientError, XrpcResult},
    http_client::HttpClient,
    session::{CredentialStore, Credentials, MemoryCredentialStore},
    xrpc::{AuthRequirement, XrpcClient, XrpcExt, XrpcRequest, XrpcResponse},
};
use smol_str::SmolStr;
use tokio::sync::{Mutex, RwLock};
use url::Url;

use crate::client::{ClientOptions, Session, parse_service_url};

/// Where one call attempt goes, and as whom.
struct Route {
    base: Url,
    /// Identity and access token attached to the call, if any.
    auth: Option<(SmolStr, BearerToken)>,
}

/// Stateful client for app-password sessions.
///
/// - Holds at most one active [`Session`]; credentials live in a pluggable
///   [`CredentialStore`] keyed by DID.
/// - Resolves each call's service URL and bearer token from the endpoint's
///   declared [`AuthRequirement`].
/// - On a 401-class rejection of an authorized call, refreshes once
///   (single-flight across concurrent callers) and retries once.
///
/// Sign-in, sign-out, switching and refresh are serialized behind one gate.
pub struct SessionManager<S, T> {
    client: Arc<T>,
    store: Arc<S>,
    options: ClientOptions,
    public_endpoint: Url,
    active: RwLock<Option<Session>>,
    gate: Mutex<()>,
}

impl SessionManager<MemoryCredentialStore, reqwest::Client> {
    /// Manager over the bundled `reqwest` transport with in-memory credentials.
    pub fn with_options(options: ClientOptions) -> XrpcResult<Self> {
        let client = options.http_client()?;
        Self::new(
            Arc::new(client),
            Arc::new(MemoryCredentialStore::default()),
            options,
        )
    }
}

impl<S, T> SessionManager<S, T>
where
    S: CredentialStore,
{
    /// Create a manager over the given transport and store.
    ///
    /// Fails with [`ClientError::InvalidRequestUrl`] if the configured public
    /// endpoint cannot serve as a base URL.
    pub fn new(client: Arc<T>, store: Arc<S>, options: ClientOptions) -> XrpcResult<Self> {
        let public_endpoint = parse_service_url(&options.public_endpoint)?;
        Ok(Self {
            client,
            store,
            options,
            public_endpoint,
            active: RwLock::new(None),
            gate: Mutex::new(()),
        })
    }

    /// Client configuration.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The credential store backing this manager.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// The active session, or [`ClientError::NoActiveSession`].
    pub async fn active_session(&self) -> XrpcResult<Session> {
        self.active
            .read()
            .await
            .clone()
            .ok_or(ClientError::NoActiveSession)
    }

    /// Service URL for a call.
    ///
    /// The active session's endpoint when signed in; otherwise the public
    /// endpoint, unless `requires_auth`, which fails with
    /// [`ClientError::NoActiveSession`].
    pub async fn resolve_service_url(&self, requires_auth: bool) -> XrpcResult<Url> {
        match &*self.active.read().await {
            Some(session) => Ok(session.service_endpoint.clone()),
            None if requires_auth => Err(ClientError::NoActiveSession),
            None => Ok(self.public_endpoint.clone()),
        }
    }

    /// Current access token of the active session, if any.
    pub async fn access_token(&self) -> XrpcResult<Option<BearerToken>> {
        let active = self.active.read().await;
        let Some(session) = active.as_ref() else {
            return Ok(None);
        };
        Ok(self.store.access_token(&session.did).await?)
    }

    /// Base URL and bearer token for one call attempt.
    ///
    /// The session and its credentials are read under one read lock, so a
    /// concurrent sign-in or switch is observed entirely or not at all.
    async fn route(&self, requirement: AuthRequirement) -> XrpcResult<Route> {
        let active = self.active.read().await;
        let Some(session) = active.as_ref() else {
            return match requirement {
                AuthRequirement::Required => Err(ClientError::NoActiveSession),
                _ => Ok(Route {
                    base: self.public_endpoint.clone(),
                    auth: None,
                }),
            };
        };
        let token = match requirement {
            AuthRequirement::None => None,
            AuthRequirement::Optional => self.store.access_token(&session.did).await?,
            AuthRequirement::Required => Some(
                self.store
                    .access_token(&session.did)
                    .await?
                    .ok_or(ClientError::NoActiveSession)?,
            ),
        };
        Ok(Route {
            base: session.service_endpoint.clone(),
            auth: token.map(|token| (session.did.clone(), token)),
        })
    }

    async fn activate(&self, session: Session) {
        #[cfg(feature = "tracing")]
        tracing::debug!(did = %session.did, endpoint = %session.service_endpoint, "session activated");
        *self.active.write().await = Some(session);
    }
}

impl<S, T> SessionManager<S, T>
where
    S: CredentialStore,
    T: HttpClient + Send + Sync,
{
    /// Rotate the active session's credentials unless another caller already has.
    ///
    /// `stale` is the access token the caller's rejected request carried. If
    /// the stored token differs from it, the stored token is returned without
    /// a network call. Otherwise `com.atproto.server.refreshSession` is called
    /// with the refresh token and the new pair replaces the old one in a
    /// single store write. On failure nothing is changed.
    pub async fn refresh_if_needed(&self, stale: &BearerToken) -> XrpcResult<BearerToken> {
        let did = self.active_session().await?.did;
        self.refresh_for(&did, stale).await
    }

    /// [`refresh_if_needed`](Self::refresh_if_needed) pinned to one identity.
    ///
    /// Fails with [`ClientError::NoActiveSession`] if `did` is no longer the
    /// active session once the gate is held; another identity's pair is never
    /// read or rotated.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, stale)))]
    async fn refresh_for(&self, did: &str, stale: &BearerToken) -> XrpcResult<BearerToken> {
        let _gate = self.gate.lock().await;
        let session = self.active_session().await?;
        if session.did != did {
            #[cfg(feature = "tracing")]
            tracing::debug!(active = %session.did, "session switched during call");
            return Err(ClientError::NoActiveSession);
        }
        let current = self
            .store
            .get(&session.did)
            .await?
            .ok_or(ClientError::NoActiveSession)?;

        if current.access_jwt.as_str() != stale.as_str() {
            #[cfg(feature = "tracing")]
            tracing::debug!(did = %session.did, "credentials already rotated");
            return Ok(current.access());
        }

        let mut opts = self.options.call_options();
        opts.auth = Some(current.refresh());
        let output = self
            .client
            .xrpc(session.service_endpoint.clone())
            .with_options(opts)
            .send(&RefreshSession)
            .await?
            .into_output()?;

        let rotated = Credentials::new(output.access_jwt, output.refresh_jwt);
        let token = rotated.access();
        self.store.set(&session.did, rotated).await?;

        #[cfg(feature = "tracing")]
        tracing::debug!(did = %session.did, "credentials rotated");
        Ok(token)
    }

    /// Sign in with an identifier and (app) password against `pds`.
    ///
    /// Stores the returned credentials and activates the session. The
    /// session's endpoint is the PDS declared in the returned DID document
    /// when there is one, `pds` otherwise.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip(self, password)))]
    pub async fn login(&self, identifier: &str, password: &str, pds: &str) -> XrpcResult<Session> {
        let pds = parse_service_url(pds)?;
        let request = CreateSession::new()
            .identifier(identifier)
            .password(password)
            .build();

        let _gate = self.gate.lock().await;
        let output = self
            .client
            .xrpc(pds.clone())
            .with_options(self.options.call_options())
            .send(&request)
            .await?
            .into_output()?;

        let endpoint = output
            .did_doc
            .as_ref()
            .and_then(pds_endpoint)
            .unwrap_or(pds);
        let session = Session::from_url(output.did, output.handle, endpoint)?;
        self.store
            .set(
                &session.did,
                Credentials::new(output.access_jwt, output.refresh_jwt),
            )
            .await?;
        self.activate(session.clone()).await;
        Ok(session)
    }

    /// Activate a previously persisted session, storing its credentials.
    pub async fn restore(&self, session: Session, credentials: Credentials) -> XrpcResult<()> {
        let _gate = self.gate.lock().await;
        self.store.set(&session.did, credentials).await?;
        self.activate(session).await;
        Ok(())
    }

    /// Activate another session whose credentials are already stored.
    pub async fn switch_session(&self, session: Session) -> XrpcResult<()> {
        let _gate = self.gate.lock().await;
        if self.store.get(&session.did).await?.is_none() {
            return Err(ClientError::NoActiveSession);
        }
        self.activate(session).await;
        Ok(())
    }

    /// Clear the active session and delete its credentials. Local only.
    pub async fn logout(&self) -> XrpcResult<()> {
        let _gate = self.gate.lock().await;
        let Some(session) = self.active.write().await.take() else {
            return Ok(());
        };
        self.store.del(&session.did).await?;
        #[cfg(feature = "tracing")]
        tracing::debug!(did = %session.did, "signed out");
        Ok(())
    }

    async fn dispatch<R>(&self, request: &R) -> XrpcResult<XrpcResponse<R>>
    where
        R: XrpcRequest + Sync,
    {
        let Route { base, auth } = self.route(R::AUTH).await?;
        let mut opts = self.options.call_options();
        opts.auth = auth.as_ref().map(|(_, token)| token.clone());

        let result = self
            .client
            .xrpc(base.clone())
            .with_options(opts.clone())
            .send(request)
            .await;

        let Some((did, stale)) = auth else {
            return result;
        };
        match result {
            Err(rejected) if rejected.is_auth_failure() => {
                let fresh = match self.refresh_for(&did, &stale).await {
                    Ok(token) => token,
                    Err(_refresh_error) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(nsid = R::NSID, error = %_refresh_error, "token refresh failed");
                        return Err(rejected);
                    }
                };
                opts.auth = Some(fresh);
                self.client
                    .xrpc(base)
                    .with_options(opts)
                    .send(request)
                    .await
            }
            other => other,
        }
    }
}

impl<S, T> HttpClient for SessionManager<S, T>
where
    S: CredentialStore + 'static,
    T: HttpClient + Send + Sync + 'static,
{
    type Error = T::Error;

    async fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> core::result::Result<http::Response<Vec<u8>>, Self::Error> {
        self.client.send_http(request).await
    }
}

impl<S, T> XrpcClient for SessionManager<S, T>
where
    S: CredentialStore + 'static,
    T: HttpClient + Send + Sync + 'static,
{
    async fn send<R>(&self, request: R) -> XrpcResult<XrpcResponse<R>>
    where
        R: XrpcRequest + Send + Sync,
        <R as XrpcRequest>::Response: Send + Sync,
    {
        self.dispatch(&request).await
    }
}
