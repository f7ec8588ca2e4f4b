pub mod add_reaction;

use atkit_common::smol_str::SmolStr;

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageViewSender {
    pub did: SmolStr,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReactionViewSender {
    pub did: SmolStr,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReactionView {
    pub created_at: SmolStr,
    pub sender: ReactionViewSender,
    pub value: SmolStr,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub embed: std::option::Option<serde_json::Value>,
    ///Annotations of text (mentions, URLs, hashtags, etc)
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub facets: std::option::Option<Vec<serde_json::Value>>,
    pub id: SmolStr,
    ///Reactions to this message, in ascending order of creation time.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub reactions: std::option::Option<Vec<ReactionView>>,
    pub rev: SmolStr,
    pub sender: MessageViewSender,
    pub sent_at: SmolStr,
    pub text: SmolStr,
}
