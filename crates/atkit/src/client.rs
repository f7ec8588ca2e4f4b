//! Client configuration and the signed-in session model.

pub mod session_manager;
/// File-backed credential storage
pub mod token;

use std::time::Duration;

use atkit_common::error::{ClientError, TransportError, XrpcResult};
use atkit_common::xrpc::CallOptions;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use url::Url;

pub use atkit_common::session::{CredentialStore, Credentials, MemoryCredentialStore};
pub use session_manager::SessionManager;
pub use token::FileCredentialStore;

/// Public Bluesky AppView, used for unauthenticated calls.
pub const PUBLIC_APPVIEW: &str = "https://public.api.bsky.app";

/// Default `User-Agent` header value.
pub const DEFAULT_USER_AGENT: &str = concat!("atkit/", env!("CARGO_PKG_VERSION"));

/// A signed-in identity and the service that hosts it.
///
/// The DID doubles as the key of the identity's credentials in a
/// [`CredentialStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Account DID
    pub did: SmolStr,
    /// Account handle at sign-in time
    pub handle: SmolStr,
    /// Absolute base URL of the account's service (PDS)
    pub service_endpoint: Url,
}

impl Session {
    /// Build a session, validating the service endpoint.
    ///
    /// Fails with [`ClientError::InvalidRequestUrl`] unless `service_endpoint`
    /// is an absolute URL usable as a base.
    pub fn new(
        did: impl Into<SmolStr>,
        handle: impl Into<SmolStr>,
        service_endpoint: &str,
    ) -> XrpcResult<Self> {
        Ok(Self {
            did: did.into(),
            handle: handle.into(),
            service_endpoint: parse_service_url(service_endpoint)?,
        })
    }

    /// Build a session from an already parsed endpoint.
    pub fn from_url(
        did: impl Into<SmolStr>,
        handle: impl Into<SmolStr>,
        service_endpoint: Url,
    ) -> XrpcResult<Self> {
        if service_endpoint.cannot_be_a_base() {
            return Err(ClientError::invalid_url(
                service_endpoint.as_str(),
                "cannot be used as a base URL",
            ));
        }
        Ok(Self {
            did: did.into(),
            handle: handle.into(),
            service_endpoint,
        })
    }
}

/// Parse a service base URL, rejecting relative and non-base URLs.
pub fn parse_service_url(raw: &str) -> XrpcResult<Url> {
    let url = Url::parse(raw).map_err(|e| ClientError::invalid_url(raw, e))?;
    if url.cannot_be_a_base() {
        return Err(ClientError::invalid_url(raw, "cannot be used as a base URL"));
    }
    Ok(url)
}

/// Client-wide configuration.
///
/// ```
/// use atkit::client::ClientOptions;
/// use std::time::Duration;
///
/// let options = ClientOptions::new()
///     .timeout(Duration::from_secs(10))
///     .accept_labelers(vec!["did:plc:ar7c4by46qjdydhdevvrndac".into()])
///     .build();
/// assert_eq!(options.public_endpoint, "https://public.api.bsky.app");
/// ```
#[derive(Debug, Clone, bon::Builder)]
#[builder(start_fn = new)]
pub struct ClientOptions {
    /// Service used when no session is active and the endpoint allows it
    #[builder(into, default = SmolStr::new_static(PUBLIC_APPVIEW))]
    pub public_endpoint: SmolStr,
    /// `User-Agent` sent by the bundled transport
    #[builder(into, default = SmolStr::new_static(DEFAULT_USER_AGENT))]
    pub user_agent: SmolStr,
    /// Whole-request timeout for the bundled transport
    #[builder(default = Duration::from_secs(30))]
    pub timeout: Duration,
    /// Labelers requested through `atproto-accept-labelers` on every call
    #[builder(default)]
    pub accept_labelers: Vec<SmolStr>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new().build()
    }
}

impl ClientOptions {
    /// Build a `reqwest` client carrying the configured user agent and timeout.
    pub fn http_client(&self) -> XrpcResult<reqwest::Client> {
        let builder = reqwest::Client::builder().user_agent(self.user_agent.as_str());
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(self.timeout);
        builder
            .build()
            .map_err(|e| ClientError::Network(TransportError::from(e)))
    }

    /// Default per-call options derived from this configuration.
    pub fn call_options(&self) -> CallOptions {
        CallOptions {
            atproto_accept_labelers: (!self.accept_labelers.is_empty())
                .then(|| self.accept_labelers.clone()),
            ..CallOptions::default()
        }
    }
}
