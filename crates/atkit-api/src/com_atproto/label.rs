pub mod query_labels;

use atkit_common::smol_str::SmolStr;

///Metadata tag on an atproto resource (eg, repo or record).
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    ///Optionally, CID specifying the specific version of 'uri' resource this label applies to.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub cid: std::option::Option<SmolStr>,
    ///Timestamp when this label was created.
    pub cts: SmolStr,
    ///Timestamp at which this label expires (no longer applies).
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub exp: std::option::Option<SmolStr>,
    ///If true, this is a negation label, overwriting a previous label.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub neg: std::option::Option<bool>,
    ///Signature of dag-cbor encoded label.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub sig: std::option::Option<serde_json::Value>,
    ///DID of the actor who created this label.
    pub src: SmolStr,
    ///AT URI of the record, repository (account), or other resource that this label applies to.
    pub uri: SmolStr,
    ///The short string name of the value or type of this label.
    pub val: SmolStr,
    ///The AT Protocol version of the label object.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub ver: std::option::Option<i64>,
}

impl Label {
    /// Whether this label retracts an earlier one with the same value.
    pub fn is_negation(&self) -> bool {
        self.neg.unwrap_or(false)
    }
}
