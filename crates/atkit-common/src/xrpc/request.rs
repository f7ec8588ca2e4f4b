//! Outgoing request assembly.

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderName, HeaderValue, Method, Request};
use url::Url;

use crate::BearerToken;
use crate::error::EncodeError;

/// HTTP verbs used by XRPC endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl Verb {
    /// Get the HTTP method string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl From<Verb> for Method {
    fn from(verb: Verb) -> Self {
        match verb {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Delete => Method::DELETE,
        }
    }
}

/// Builder for a single outgoing request.
///
/// Construction is pure. A body only reaches the wire together with a
/// content type; a body set without one is dropped.
///
/// ```
/// use atkit_common::BearerToken;
/// use atkit_common::xrpc::{RequestBuilder, Verb};
///
/// let url = url::Url::parse("https://pds.example/xrpc/com.atproto.server.getSession").unwrap();
/// let request = RequestBuilder::new(url, Verb::Get)
///     .accept("application/json")
///     .auth(BearerToken::new("access"))
///     .build()
///     .unwrap();
/// assert_eq!(request.headers()["authorization"], "Bearer access");
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    url: Url,
    verb: Verb,
    accept: Option<HeaderValue>,
    content_type: Option<HeaderValue>,
    auth: Option<BearerToken>,
    body: Option<Vec<u8>>,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl RequestBuilder {
    /// Start a request for `url` with the given verb.
    pub fn new(url: Url, verb: Verb) -> Self {
        Self {
            url,
            verb,
            accept: None,
            content_type: None,
            auth: None,
            body: None,
            headers: Vec::new(),
        }
    }

    /// Set the `Accept` header.
    pub fn accept(mut self, mime: &'static str) -> Self {
        self.accept = Some(HeaderValue::from_static(mime));
        self
    }

    /// Set the `Content-Type` of the body.
    pub fn content_type(mut self, mime: &'static str) -> Self {
        self.content_type = Some(HeaderValue::from_static(mime));
        self
    }

    /// Attach a bearer credential.
    pub fn auth(mut self, token: BearerToken) -> Self {
        self.auth = Some(token);
        self
    }

    /// Attach an encoded body.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Add an extra header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    /// Assemble the request.
    pub fn build(self) -> Result<Request<Vec<u8>>, EncodeError> {
        let mut builder = Request::builder()
            .method(Method::from(self.verb))
            .uri(self.url.as_str());

        if let Some(accept) = self.accept {
            builder = builder.header(ACCEPT, accept);
        }
        if let Some(token) = &self.auth {
            builder = builder.header(AUTHORIZATION, token.header_value()?);
        }
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        let body = match (self.content_type, self.body) {
            (Some(content_type), Some(body)) => {
                builder = builder.header(CONTENT_TYPE, content_type);
                body
            }
            _ => Vec::new(),
        };

        Ok(builder.body(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://pds.example/xrpc/chat.bsky.convo.addReaction").unwrap()
    }

    #[test]
    fn json_body_carries_content_type() {
        let req = RequestBuilder::new(url(), Verb::Post)
            .accept("application/json")
            .content_type("application/json")
            .body(br#"{"value":"x"}"#.to_vec())
            .build()
            .unwrap();
        assert_eq!(req.method(), Method::POST);
        assert_eq!(req.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(req.headers()[ACCEPT], "application/json");
        assert_eq!(req.body(), br#"{"value":"x"}"#);
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn body_without_content_type_is_dropped() {
        let req = RequestBuilder::new(url(), Verb::Get)
            .body(b"ignored".to_vec())
            .build()
            .unwrap();
        assert!(req.body().is_empty());
        assert!(req.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn authorization_is_bearer_verbatim() {
        let req = RequestBuilder::new(url(), Verb::Delete)
            .auth(BearerToken::new("eyJ.token.sig"))
            .build()
            .unwrap();
        assert_eq!(req.method(), Method::DELETE);
        assert_eq!(req.headers()[AUTHORIZATION], "Bearer eyJ.token.sig");
    }

    #[test]
    fn unencodable_token_is_an_encode_error() {
        let err = RequestBuilder::new(url(), Verb::Put)
            .auth(BearerToken::new("bad\ntoken"))
            .build()
            .unwrap_err();
        assert!(matches!(err, EncodeError::Header(_)));
    }
}
