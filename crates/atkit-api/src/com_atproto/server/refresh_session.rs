use atkit_common::smol_str::SmolStr;
use atkit_common::xrpc::{AuthRequirement, Verb, XrpcMethod, XrpcRequest, XrpcResp};

#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RefreshSessionOutput {
    pub access_jwt: SmolStr,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub active: std::option::Option<bool>,
    pub did: SmolStr,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub did_doc: std::option::Option<serde_json::Value>,
    pub handle: SmolStr,
    pub refresh_jwt: SmolStr,
    ///Hosting status of the account. If not specified, then assume 'active'.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub status: std::option::Option<SmolStr>,
}

impl std::fmt::Debug for RefreshSessionOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshSessionOutput")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

///Refresh an authentication session. Requires auth using the 'refreshJwt' (not the 'accessJwt').
///
///The caller supplies the refresh token explicitly; the session's access token is never attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RefreshSession;

/// Response type for
///com.atproto.server.refreshSession
pub struct RefreshSessionResponse;

impl XrpcResp for RefreshSessionResponse {
    const NSID: &'static str = "com.atproto.server.refreshSession";
    const ENCODING: &'static str = "application/json";
    type Output = RefreshSessionOutput;
}

impl XrpcRequest for RefreshSession {
    const NSID: &'static str = "com.atproto.server.refreshSession";
    const METHOD: XrpcMethod = XrpcMethod::Call {
        verb: Verb::Post,
        encoding: None,
    };
    const AUTH: AuthRequirement = AuthRequirement::None;

    type Response = RefreshSessionResponse;
}
