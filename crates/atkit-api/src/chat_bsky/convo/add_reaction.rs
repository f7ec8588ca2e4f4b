use atkit_common::error::ApiError;
use atkit_common::smol_str::SmolStr;
use atkit_common::xrpc::{XrpcMethod, XrpcRequest, XrpcResp};

///Adds an emoji reaction to a message. Requires authentication. It is idempotent, so multiple calls from the same user with the same emoji result in a single reaction.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct AddReaction {
    #[builder(into)]
    pub convo_id: SmolStr,
    #[builder(into)]
    pub message_id: SmolStr,
    #[builder(into)]
    pub value: SmolStr,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AddReactionOutput {
    pub message: crate::chat_bsky::convo::MessageView,
}

/// Error kinds declared by chat.bsky.convo.addReaction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, miette::Diagnostic)]
pub enum AddReactionError {
    ///Indicates that the message has been deleted and reactions can no longer be added/removed.
    #[error("ReactionMessageDeleted")]
    #[diagnostic(code(atkit::chat::reaction_message_deleted))]
    ReactionMessageDeleted(std::option::Option<SmolStr>),
    ///Indicates that the message has the maximum number of reactions allowed for a single user, and the requested reaction wasn't yet present. If it was already present, the request will not fail since it is idempotent.
    #[error("ReactionLimitReached")]
    #[diagnostic(code(atkit::chat::reaction_limit_reached))]
    ReactionLimitReached(std::option::Option<SmolStr>),
    ///Indicates the value for the reaction is not acceptable. In general, this means it is not an emoji.
    #[error("ReactionInvalidValue")]
    #[diagnostic(code(atkit::chat::reaction_invalid_value))]
    ReactionInvalidValue(std::option::Option<SmolStr>),
}

impl AddReactionError {
    /// Match a generic API error against the kinds this endpoint declares.
    pub fn from_api(error: &ApiError) -> Option<Self> {
        let message = error.message.clone();
        match error.error.as_str() {
            "ReactionMessageDeleted" => Some(Self::ReactionMessageDeleted(message)),
            "ReactionLimitReached" => Some(Self::ReactionLimitReached(message)),
            "ReactionInvalidValue" => Some(Self::ReactionInvalidValue(message)),
            _ => None,
        }
    }
}

/// Response type for
///chat.bsky.convo.addReaction
pub struct AddReactionResponse;

impl XrpcResp for AddReactionResponse {
    const NSID: &'static str = "chat.bsky.convo.addReaction";
    const ENCODING: &'static str = "application/json";
    type Output = AddReactionOutput;
}

impl XrpcRequest for AddReaction {
    const NSID: &'static str = "chat.bsky.convo.addReaction";
    const METHOD: XrpcMethod = XrpcMethod::Procedure("application/json");
    const SERVICE_PROXY: Option<&'static str> = Some(crate::chat_bsky::CHAT_SERVICE_PROXY);

    type Response = AddReactionResponse;
}
