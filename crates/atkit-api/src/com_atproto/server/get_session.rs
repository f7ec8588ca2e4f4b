use atkit_common::smol_str::SmolStr;
use atkit_common::xrpc::{XrpcMethod, XrpcRequest, XrpcResp};

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GetSessionOutput {
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub active: std::option::Option<bool>,
    pub did: SmolStr,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub did_doc: std::option::Option<serde_json::Value>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub email: std::option::Option<SmolStr>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub email_auth_factor: std::option::Option<bool>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub email_confirmed: std::option::Option<bool>,
    pub handle: SmolStr,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub status: std::option::Option<SmolStr>,
}

///Get information about the current auth session. Requires auth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GetSession;

/// Response type for
///com.atproto.server.getSession
pub struct GetSessionResponse;

impl XrpcResp for GetSessionResponse {
    const NSID: &'static str = "com.atproto.server.getSession";
    const ENCODING: &'static str = "application/json";
    type Output = GetSessionOutput;
}

impl XrpcRequest for GetSession {
    const NSID: &'static str = "com.atproto.server.getSession";
    const METHOD: XrpcMethod = XrpcMethod::Query;

    type Response = GetSessionResponse;
}
