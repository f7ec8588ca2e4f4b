use atkit_common::error::EncodeError;
use atkit_common::query::{Bounds, QueryParams};
use atkit_common::smol_str::SmolStr;
use atkit_common::xrpc::{AuthRequirement, CursorRequest, Page, XrpcMethod, XrpcRequest, XrpcResp};

/// Accepted range for `limit`.
pub const LIMIT: Bounds = Bounds::new(1, 250).with_default(50);

///Find labels relevant to the provided AT-URI patterns. Public endpoint for moderation services, though may return different or additional results with auth.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, bon::Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct QueryLabels {
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    #[builder(into)]
    pub cursor: std::option::Option<SmolStr>,
    ///Defaults to `50`. Min: 1. Max: 250.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub limit: std::option::Option<i64>,
    ///Optional list of label sources (DIDs) to filter on.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub sources: std::option::Option<Vec<SmolStr>>,
    ///List of AT URI patterns to match (boolean 'OR'). Each may be a prefix (ending with '*'; will match inclusive of the string leading to '*'), or a full URI.
    pub uri_patterns: Vec<SmolStr>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryLabelsOutput {
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub cursor: std::option::Option<SmolStr>,
    pub labels: Vec<crate::com_atproto::label::Label>,
}

/// Response type for
///com.atproto.label.queryLabels
pub struct QueryLabelsResponse;

impl XrpcResp for QueryLabelsResponse {
    const NSID: &'static str = "com.atproto.label.queryLabels";
    const ENCODING: &'static str = "application/json";
    type Output = QueryLabelsOutput;
}

impl XrpcRequest for QueryLabels {
    const NSID: &'static str = "com.atproto.label.queryLabels";
    const METHOD: XrpcMethod = XrpcMethod::Query;
    const AUTH: AuthRequirement = AuthRequirement::Optional;

    type Response = QueryLabelsResponse;

    fn encode_query(&self) -> Result<QueryParams, EncodeError> {
        let mut query = QueryParams::new();
        query
            .push_all("uriPatterns", &self.uri_patterns)
            .push_all("sources", self.sources.iter().flatten())
            .push_bounded("limit", self.limit, LIMIT)
            .push_opt("cursor", self.cursor.as_ref());
        Ok(query)
    }
}

impl CursorRequest for QueryLabels {
    type Item = crate::com_atproto::label::Label;

    fn set_cursor(&mut self, cursor: Option<SmolStr>) {
        self.cursor = cursor;
    }

    fn into_page(output: QueryLabelsOutput) -> Page<Self::Item> {
        Page {
            cursor: output.cursor,
            items: output.labels,
        }
    }
}
