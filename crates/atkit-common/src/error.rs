//! Error types for XRPC client operations
//!
//! Every call surfaces failures through [`ClientError`]. Nothing in the
//! pipeline swallows an error; the single locally handled case is the one-shot
//! token refresh performed by the session layer on an authorization failure.

use bytes::Bytes;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::session::CredentialStoreError;

/// Client error type wrapping all possible error conditions
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ClientError {
    /// An authorization-requiring call was attempted with no signed-in identity
    #[error("no active session")]
    #[diagnostic(
        code(atkit::no_active_session),
        help("sign in (or restore a stored session) before calling authenticated endpoints")
    )]
    NoActiveSession,

    /// A service endpoint or constructed URL failed to parse
    #[error("invalid request URL {url:?}: {reason}")]
    #[diagnostic(code(atkit::invalid_request_url))]
    InvalidRequestUrl {
        /// The offending input
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// HTTP transport error
    #[error("network error: {0}")]
    Network(
        #[from]
        #[diagnostic_source]
        TransportError,
    ),

    /// Request serialization failed
    #[error("{0}")]
    Encode(
        #[from]
        #[diagnostic_source]
        EncodeError,
    ),

    /// A 2xx response body did not match the expected output shape
    #[error("{0}")]
    Decode(
        #[from]
        #[diagnostic_source]
        DecodeError,
    ),

    /// The server explicitly rejected the call
    #[error("{0}")]
    Api(
        #[from]
        #[diagnostic_source]
        ApiError,
    ),

    /// Non-2xx response whose body is not an XRPC error payload
    #[error("unexpected response: {0}")]
    UnexpectedResponse(
        #[from]
        #[diagnostic_source]
        HttpError,
    ),

    /// Credential storage backend failed
    #[error("credential store error: {0}")]
    Credentials(
        #[from]
        #[diagnostic_source]
        CredentialStoreError,
    ),
}

impl ClientError {
    /// Build an [`ClientError::InvalidRequestUrl`] from any displayable reason.
    pub fn invalid_url(url: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::InvalidRequestUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this is a 401-class rejection that a token refresh may fix.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_auth_failure())
    }
}

/// Transport-level errors that occur during HTTP communication
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TransportError {
    /// Failed to establish connection to server
    #[error("Connection error: {0}")]
    #[diagnostic(code(atkit::transport::connect))]
    Connect(String),

    /// Request timed out
    #[error("Request timeout")]
    #[diagnostic(code(atkit::transport::timeout))]
    Timeout,

    /// Other transport error
    #[error("Transport error: {0}")]
    #[diagnostic(code(atkit::transport::other))]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Classify an error coming out of an [`HttpClient`](crate::http_client::HttpClient).
    ///
    /// Errors from the bundled reqwest transport are mapped to `Connect` and
    /// `Timeout` where possible; anything else is wrapped as `Other`.
    pub fn from_client_error<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(error);
        #[cfg(feature = "reqwest-client")]
        let boxed = match boxed.downcast::<reqwest::Error>() {
            Ok(e) => return Self::from(*e),
            Err(other) => other,
        };
        Self::Other(boxed)
    }
}

#[cfg(feature = "reqwest-client")]
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connect(e.to_string())
        } else {
            Self::Other(Box::new(e))
        }
    }
}

/// Error type for encoding XRPC requests
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum EncodeError {
    /// Failed to serialize query parameters
    #[error("Failed to serialize query: {0}")]
    #[diagnostic(code(atkit::encode::query))]
    Query(
        #[from]
        #[source]
        serde_html_form::ser::Error,
    ),
    /// Failed to serialize JSON body
    #[error("Failed to serialize JSON: {0}")]
    #[diagnostic(code(atkit::encode::json))]
    Json(
        #[from]
        #[source]
        serde_json::Error,
    ),
    /// A header value contained characters that cannot go on the wire
    #[error("Invalid header value: {0}")]
    #[diagnostic(code(atkit::encode::header))]
    Header(
        #[from]
        #[source]
        http::header::InvalidHeaderValue,
    ),
    /// The HTTP request could not be assembled
    #[error("Failed to build HTTP request: {0}")]
    #[diagnostic(code(atkit::encode::http))]
    Http(
        #[from]
        #[source]
        http::Error,
    ),
}

/// Response deserialization error, carrying the raw body for diagnostics
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("Failed to decode {nsid} response: {source}")]
#[diagnostic(code(atkit::decode))]
pub struct DecodeError {
    /// XRPC method whose output failed to decode
    pub nsid: &'static str,
    /// Underlying JSON error
    #[source]
    pub source: serde_json::Error,
    /// Raw response body
    pub body: Bytes,
}

impl DecodeError {
    /// Body as UTF-8 text, if it is valid UTF-8.
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// XRPC error payload returned by the server on non-2xx responses
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    /// Error kind (e.g., "InvalidRequest", "ExpiredToken")
    pub error: SmolStr,
    /// Optional error message with details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<SmolStr>,
    /// HTTP status code (context only; not serialized)
    #[serde(skip)]
    pub status: StatusCode,
    /// XRPC method NSID that produced this error (context only; not serialized)
    #[serde(skip)]
    pub nsid: &'static str,
}

impl ApiError {
    /// Error kinds the protocol uses for stale or bad access tokens.
    pub const AUTH_KINDS: [&'static str; 2] = ["ExpiredToken", "InvalidToken"];

    /// Parse an XRPC error body, attaching status and method context.
    pub fn from_body(body: &[u8], status: StatusCode, nsid: &'static str) -> Option<Self> {
        let mut error: ApiError = serde_json::from_slice(body).ok()?;
        error.status = status;
        error.nsid = nsid;
        Some(error)
    }

    /// 401-class: a 401 status, or a 400 whose kind names an expired/invalid token.
    pub fn is_auth_failure(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
            || (self.status == StatusCode::BAD_REQUEST
                && Self::AUTH_KINDS.contains(&self.error.as_str()))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(msg) = &self.message {
            write!(
                f,
                "{}: {} (nsid={}, status={})",
                self.error, msg, self.nsid, self.status
            )
        } else {
            write!(f, "{} (nsid={}, status={})", self.error, self.nsid, self.status)
        }
    }
}

impl std::error::Error for ApiError {}

impl miette::Diagnostic for ApiError {
    fn code<'a>(&'a self) -> Option<Box<dyn std::fmt::Display + 'a>> {
        Some(Box::new("atkit::api"))
    }
}

/// HTTP error response whose body could not be read as an XRPC error
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[diagnostic(code(atkit::unexpected_response))]
pub struct HttpError {
    /// HTTP status code
    pub status: StatusCode,
    /// Response body
    pub body: Bytes,
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Ok(s) = std::str::from_utf8(&self.body) {
            if !s.is_empty() {
                write!(f, ":\n{}", s)?;
            }
        }
        Ok(())
    }
}

/// Result type for client operations
pub type XrpcResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_auth_classification() {
        let expired =
            ApiError::from_body(br#"{"error":"ExpiredToken"}"#, StatusCode::BAD_REQUEST, "a.b.c")
                .unwrap();
        assert!(expired.is_auth_failure());

        let unauthorized =
            ApiError::from_body(br#"{"error":"AuthMissing"}"#, StatusCode::UNAUTHORIZED, "a.b.c")
                .unwrap();
        assert!(unauthorized.is_auth_failure());

        let invalid = ApiError::from_body(
            br#"{"error":"InvalidRequest","message":"bad cursor"}"#,
            StatusCode::BAD_REQUEST,
            "a.b.c",
        )
        .unwrap();
        assert!(!invalid.is_auth_failure());
        assert_eq!(
            invalid.to_string(),
            "InvalidRequest: bad cursor (nsid=a.b.c, status=400 Bad Request)"
        );
    }

    #[test]
    fn non_payload_bodies_are_not_api_errors() {
        for body in [&b"<html>oops</html>"[..], b"", br#"{"message":"no kind"}"#] {
            assert!(ApiError::from_body(body, StatusCode::BAD_GATEWAY, "a.b.c").is_none());
        }
    }

    #[test]
    fn unknown_client_errors_are_wrapped() {
        let io = std::io::Error::other("boom");
        match TransportError::from_client_error(io) {
            TransportError::Other(e) => assert_eq!(e.to_string(), "boom"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
