//! Common types for the atkit XRPC pipeline.
//!
//! Everything an endpoint binding needs to go from a typed request to a typed
//! response lives here: the error taxonomy, the HTTP transport abstraction,
//! query and request construction, response decoding, the pagination
//! contract, and credential storage.

#![warn(missing_docs)]
pub use bytes;
pub use http;
pub use smol_str;
pub use url;

use smol_str::SmolStr;

pub mod error;
/// HTTP client abstraction used by atkit crates.
pub mod http_client;
pub mod query;
/// Generic credential storage traits and utilities.
pub mod session;
pub mod xrpc;

pub use error::{ClientError, XrpcResult};

/// Bearer credential attached to authorized XRPC requests.
///
/// The wrapped token is opaque and is sent verbatim. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BearerToken(SmolStr);

impl BearerToken {
    /// Wrap an access (or refresh) token.
    pub fn new(token: impl Into<SmolStr>) -> Self {
        Self(token.into())
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> Result<http::HeaderValue, http::header::InvalidHeaderValue> {
        let mut value = http::HeaderValue::from_str(&format!("Bearer {}", self.0))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

impl From<SmolStr> for BearerToken {
    fn from(token: SmolStr) -> Self {
        Self(token)
    }
}
