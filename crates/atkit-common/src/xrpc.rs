//! # Stateless XRPC utilities and request/response mapping
//!
//! Mapping overview:
//! - Success (2xx): parse body into the endpoint's typed output. An empty body
//!   is read as JSON `null`, so unit and optional outputs decode without a
//!   payload while struct outputs fail with [`DecodeError`].
//! - Any other status: parse an XRPC error payload (`{"error", "message"?}`)
//!   into [`ApiError`]; if the body is not one, surface the status and raw
//!   body as [`HttpError`].
//! - Transport failures become [`TransportError`] and are never retried here.

pub mod pagination;
pub mod request;

pub use pagination::{CursorRequest, Page, paginate};
pub use request::{RequestBuilder, Verb};

use crate::BearerToken;
use crate::error::{
    ApiError, ClientError, DecodeError, EncodeError, HttpError, TransportError, XrpcResult,
};
use crate::http_client::HttpClient;
use crate::query::QueryParams;
use bytes::Bytes;
use http::{HeaderName, HeaderValue, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use smol_str::SmolStr;
use std::future::Future;
use std::marker::PhantomData;
use url::Url;

/// How an endpoint pairs its HTTP verb with a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XrpcMethod {
    /// Query (HTTP GET, parameters in the query string)
    Query,
    /// Procedure (HTTP POST with a body in the given encoding)
    Procedure(&'static str),
    /// Explicit verb with an optional body encoding
    Call {
        /// HTTP verb
        verb: Verb,
        /// Body MIME type, if the call sends a body
        encoding: Option<&'static str>,
    },
}

impl XrpcMethod {
    /// The HTTP verb for this method
    pub const fn verb(&self) -> Verb {
        match self {
            Self::Query => Verb::Get,
            Self::Procedure(_) => Verb::Post,
            Self::Call { verb, .. } => *verb,
        }
    }

    /// Get the HTTP method string
    pub const fn as_str(&self) -> &'static str {
        self.verb().as_str()
    }

    /// Get the body encoding type for this method
    pub const fn body_encoding(&self) -> Option<&'static str> {
        match self {
            Self::Query => None,
            Self::Procedure(enc) => Some(*enc),
            Self::Call { encoding, .. } => *encoding,
        }
    }
}

/// Whether an endpoint needs a signed-in identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthRequirement {
    /// Fails with [`ClientError::NoActiveSession`] when nobody is signed in
    Required,
    /// Sent authenticated to the user's service when signed in, anonymously
    /// to the public service otherwise
    Optional,
    /// Never carries the session's access token
    None,
}

/// Trait for XRPC request types (queries and procedures)
///
/// This trait provides metadata about XRPC endpoints including the NSID,
/// HTTP method, auth requirement, and associated output type.
///
/// The trait is implemented on the request parameters/input type itself.
pub trait XrpcRequest: Serialize {
    /// The NSID for this XRPC method
    const NSID: &'static str;

    /// Verb/body pairing for this method
    const METHOD: XrpcMethod;

    /// Whether the call needs a signed-in identity
    const AUTH: AuthRequirement = AuthRequirement::Required;

    /// `atproto-proxy` target the user's service should forward this call to
    const SERVICE_PROXY: Option<&'static str> = None;

    /// Response type returned from the XRPC call (marker struct)
    type Response: XrpcResp;

    /// Encode the query-string parameters.
    ///
    /// Default implementation serializes queries through serde and sends no
    /// parameters otherwise. Override to clamp bounded parameters.
    fn encode_query(&self) -> Result<QueryParams, EncodeError> {
        match Self::METHOD {
            XrpcMethod::Query => QueryParams::from_serialize(self),
            _ => Ok(QueryParams::new()),
        }
    }

    /// Encode the request body.
    ///
    /// Default implementation serializes to JSON. Override for non-JSON encodings.
    fn encode_body(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a request body, the inverse of [`XrpcRequest::encode_body`].
    fn decode_body(body: &[u8]) -> Result<Self, serde_json::Error>
    where
        Self: DeserializeOwned,
    {
        serde_json::from_slice(body)
    }
}

/// Trait for XRPC Response types
///
/// It mirrors the NSID and carries the encoding type as well as the Output type
pub trait XrpcResp {
    /// The NSID for this XRPC method
    const NSID: &'static str;

    /// Output encoding (MIME type)
    const ENCODING: &'static str;

    /// Response output type
    type Output: DeserializeOwned;

    /// Decode the response output body.
    ///
    /// Default implementation deserializes from JSON, reading an empty body as `null`.
    fn decode_output(body: &Bytes) -> Result<Self::Output, DecodeError> {
        let input: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            body
        };
        serde_json::from_slice(input).map_err(|source| DecodeError {
            nsid: Self::NSID,
            source,
            body: body.clone(),
        })
    }
}

/// Output type of a response marker
pub type RespOutput<Resp> = <Resp as XrpcResp>::Output;

/// Nicer alias for Xrpc response type
pub type XrpcResponse<R> = Response<<R as XrpcRequest>::Response>;

/// Per-request options for XRPC calls.
#[derive(Debug, Default, Clone)]
pub struct CallOptions {
    /// Optional bearer credential to apply.
    pub auth: Option<BearerToken>,
    /// `atproto-proxy` header value; overrides the endpoint's declared proxy.
    pub atproto_proxy: Option<SmolStr>,
    /// `atproto-accept-labelers` header values.
    pub atproto_accept_labelers: Option<Vec<SmolStr>>,
    /// Extra headers to attach to this request.
    pub extra_headers: Vec<(HeaderName, HeaderValue)>,
}

/// Extension for stateless XRPC calls on any `HttpClient`.
///
/// Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use atkit_common::xrpc::XrpcExt;
///
/// let http = reqwest::Client::new();
/// let base = url::Url::parse("https://public.api.bsky.app")?;
/// // let output = http.xrpc(base).send(&request).await?.into_output()?;
/// # Ok(())
/// # }
/// ```
pub trait XrpcExt: HttpClient {
    /// Start building an XRPC call for the given base URL.
    fn xrpc(&self, base: Url) -> XrpcCall<'_, Self>
    where
        Self: Sized,
    {
        XrpcCall {
            client: self,
            base,
            opts: CallOptions::default(),
        }
    }
}

impl<T: HttpClient> XrpcExt for T {}

/// Stateful XRPC call trait
#[cfg_attr(not(target_arch = "wasm32"), trait_variant::make(Send))]
pub trait XrpcClient: HttpClient {
    /// Send an XRPC request and return the response wrapper
    #[cfg(not(target_arch = "wasm32"))]
    fn send<R>(&self, request: R) -> impl Future<Output = XrpcResult<XrpcResponse<R>>>
    where
        R: XrpcRequest + Send + Sync,
        <R as XrpcRequest>::Response: Send + Sync,
        Self: Sync;

    /// Send an XRPC request and return the response wrapper
    #[cfg(target_arch = "wasm32")]
    fn send<R>(&self, request: R) -> impl Future<Output = XrpcResult<XrpcResponse<R>>>
    where
        R: XrpcRequest + Send + Sync,
        <R as XrpcRequest>::Response: Send + Sync;
}

/// Stateless XRPC call builder.
///
/// Example (per-request overrides)
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use atkit_common::BearerToken;
/// use atkit_common::xrpc::XrpcExt;
///
/// let http = reqwest::Client::new();
/// let base = url::Url::parse("https://public.api.bsky.app")?;
/// let call = http
///     .xrpc(base)
///     .auth(BearerToken::new("ACCESS_JWT"))
///     .accept_labelers(vec!["did:plc:labelerid".into()])
///     .header(http::header::USER_AGENT, http::HeaderValue::from_static("atkit-example"));
/// // let resp = call.send(&request).await?;
/// # Ok(())
/// # }
/// ```
pub struct XrpcCall<'a, C: HttpClient> {
    pub(crate) client: &'a C,
    pub(crate) base: Url,
    pub(crate) opts: CallOptions,
}

impl<'a, C: HttpClient> XrpcCall<'a, C> {
    /// Apply a bearer credential to this call.
    pub fn auth(mut self, token: BearerToken) -> Self {
        self.opts.auth = Some(token);
        self
    }
    /// Set `atproto-proxy` header for this call.
    pub fn proxy(mut self, proxy: impl Into<SmolStr>) -> Self {
        self.opts.atproto_proxy = Some(proxy.into());
        self
    }
    /// Set `atproto-accept-labelers` header(s) for this call.
    pub fn accept_labelers(mut self, labelers: Vec<SmolStr>) -> Self {
        self.opts.atproto_accept_labelers = Some(labelers);
        self
    }
    /// Add an extra header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.opts.extra_headers.push((name, value));
        self
    }
    /// Replace the builder's options entirely.
    pub fn with_options(mut self, opts: CallOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Send the given typed XRPC request and return a response wrapper.
    ///
    /// Non-2xx statuses are already mapped to [`ClientError::Api`] or
    /// [`ClientError::UnexpectedResponse`]; a returned `Response` is always a
    /// success whose body still has to be decoded.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self, request), fields(nsid = R::NSID, method = R::METHOD.as_str())))]
    pub async fn send<R>(self, request: &R) -> XrpcResult<Response<<R as XrpcRequest>::Response>>
    where
        R: XrpcRequest,
    {
        let http_request = build_http_request(&self.base, request, &self.opts)?;

        let http_response = self
            .client
            .send_http(http_request)
            .await
            .map_err(TransportError::from_client_error)?;

        process_response(http_response)
    }
}

/// Process the HTTP response from the server into a proper xrpc response statelessly.
///
/// Exposed to make things more easily pluggable
#[inline]
pub fn process_response<Resp>(http_response: http::Response<Vec<u8>>) -> XrpcResult<Response<Resp>>
where
    Resp: XrpcResp,
{
    let status = http_response.status();
    let buffer = Bytes::from(http_response.into_body());

    if status.is_success() {
        return Ok(Response::new(buffer, status));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(nsid = Resp::NSID, status = %status, "xrpc call rejected");

    match ApiError::from_body(&buffer, status, Resp::NSID) {
        Some(error) => Err(ClientError::Api(error)),
        None => Err(ClientError::UnexpectedResponse(HttpError {
            status,
            body: buffer,
        })),
    }
}

/// HTTP headers commonly used in XRPC requests
pub enum Header {
    /// `atproto-proxy` header - specifies which service (app server or other atproto service) the user's PDS should forward requests to as appropriate.
    ///
    /// See: <https://atproto.com/specs/xrpc#service-proxying>
    AtprotoProxy,
    /// `atproto-accept-labelers` header used by clients to request labels from specific labelers to be included and applied in the response. See [label](https://atproto.com/specs/label) specification for details.
    AtprotoAcceptLabelers,
}

impl From<Header> for HeaderName {
    fn from(value: Header) -> Self {
        match value {
            Header::AtprotoProxy => HeaderName::from_static("atproto-proxy"),
            Header::AtprotoAcceptLabelers => HeaderName::from_static("atproto-accept-labelers"),
        }
    }
}

/// `{base}/xrpc/{nsid}`, keeping any base path and avoiding a doubled slash.
pub fn xrpc_url(base: &Url, nsid: &str) -> Url {
    let mut url = base.clone();
    let mut path = url.path().trim_end_matches('/').to_owned();
    path.push_str("/xrpc/");
    path.push_str(nsid);
    url.set_path(&path);
    url.set_query(None);
    url
}

/// Build an HTTP request for an XRPC call given base URL and options
pub fn build_http_request<R>(
    base: &Url,
    req: &R,
    opts: &CallOptions,
) -> Result<http::Request<Vec<u8>>, EncodeError>
where
    R: XrpcRequest,
{
    let mut url = xrpc_url(base, R::NSID);
    req.encode_query()?.apply_to(&mut url);

    let mut builder = RequestBuilder::new(url, R::METHOD.verb())
        .accept(<R::Response as XrpcResp>::ENCODING);

    if let Some(encoding) = R::METHOD.body_encoding() {
        builder = builder.content_type(encoding).body(req.encode_body()?);
    }

    if let Some(token) = &opts.auth {
        builder = builder.auth(token.clone());
    }

    if let Some(proxy) = opts.atproto_proxy.as_deref().or(R::SERVICE_PROXY) {
        builder = builder.header(Header::AtprotoProxy.into(), HeaderValue::from_str(proxy)?);
    }
    if let Some(labelers) = &opts.atproto_accept_labelers {
        if !labelers.is_empty() {
            let joined = labelers
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            builder = builder.header(
                Header::AtprotoAcceptLabelers.into(),
                HeaderValue::from_str(&joined)?,
            );
        }
    }
    for (name, value) in &opts.extra_headers {
        builder = builder.header(name.clone(), value.clone());
    }

    builder.build()
}

/// XRPC response wrapper that owns the response buffer
///
/// Generic over the response marker type (e.g., `ListRecordsResponse`), not the request.
pub struct Response<Resp>
where
    Resp: XrpcResp,
{
    _marker: PhantomData<fn() -> Resp>,
    buffer: Bytes,
    status: StatusCode,
}

impl<R> Response<R>
where
    R: XrpcResp,
{
    /// Create a new response from a buffer and status code
    pub fn new(buffer: Bytes, status: StatusCode) -> Self {
        Self {
            buffer,
            status,
            _marker: PhantomData,
        }
    }

    /// Get the HTTP status code
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the raw buffer
    pub fn buffer(&self) -> &Bytes {
        &self.buffer
    }

    /// Decode the body into the endpoint's output type
    pub fn parse(&self) -> XrpcResult<RespOutput<R>> {
        Ok(R::decode_output(&self.buffer)?)
    }

    /// Decode the body, consuming the response
    pub fn into_output(self) -> XrpcResult<RespOutput<R>> {
        self.parse()
    }
}

impl<R: XrpcResp> std::fmt::Debug for Response<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Response")
            .field("nsid", &R::NSID)
            .field("status", &self.status)
            .field("len", &self.buffer.len())
            .finish()
    }
}
