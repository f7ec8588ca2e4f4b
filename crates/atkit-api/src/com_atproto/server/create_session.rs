use atkit_common::smol_str::SmolStr;
use atkit_common::xrpc::{AuthRequirement, XrpcMethod, XrpcRequest, XrpcResp};

///Create an authentication session.
#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct CreateSession {
    ///When true, instead of throwing error for takendown accounts, a valid response with a narrow scoped token will be returned
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub allow_takendown: std::option::Option<bool>,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    #[builder(into)]
    pub auth_factor_token: std::option::Option<SmolStr>,
    ///Handle or other identifier supported by the server for the authenticating user.
    #[builder(into)]
    pub identifier: SmolStr,
    #[builder(into)]
    pub password: SmolStr,
}

impl std::fmt::Debug for CreateSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateSession")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish_non_exhaustive()
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionOutput {
    pub access_jwt: SmolStr,
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
    pub refresh_jwt: SmolStr,
    ///If active=false, this optional field indicates a possible reason for why the account is not active. If active=false and no status is supplied, then the host makes no claim for why the repository is no longer being hosted.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub status: std::option::Option<SmolStr>,
}

impl std::fmt::Debug for CreateSessionOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateSessionOutput")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

/// Response type for
///com.atproto.server.createSession
pub struct CreateSessionResponse;

impl XrpcResp for CreateSessionResponse {
    const NSID: &'static str = "com.atproto.server.createSession";
    const ENCODING: &'static str = "application/json";
    type Output = CreateSessionOutput;
}

impl XrpcRequest for CreateSession {
    const NSID: &'static str = "com.atproto.server.createSession";
    const METHOD: XrpcMethod = XrpcMethod::Procedure("application/json");
    const AUTH: AuthRequirement = AuthRequirement::None;

    type Response = CreateSessionResponse;
}
