use atkit_common::error::EncodeError;
use atkit_common::query::{Bounds, QueryParams};
use atkit_common::smol_str::SmolStr;
use atkit_common::xrpc::{AuthRequirement, CursorRequest, Page, XrpcMethod, XrpcRequest, XrpcResp};

/// Accepted range for `limit`; unset means the server default.
pub const LIMIT: Bounds = Bounds::new(1, 100);

///List a range of records in a repository, matching a specific collection. Does not require auth.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, bon::Builder)]
#[builder(start_fn = new)]
#[serde(rename_all = "camelCase")]
pub struct ListRecords {
    ///The NSID of the record type.
    #[builder(into)]
    pub collection: SmolStr,
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    #[builder(into)]
    pub cursor: std::option::Option<SmolStr>,
    ///Min: 1. Max: 100.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub limit: std::option::Option<i64>,
    ///The handle or DID of the repo.
    #[builder(into)]
    pub repo: SmolStr,
    ///Flag to reverse the order of the returned records.
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub reverse: std::option::Option<bool>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListRecordsOutput {
    #[serde(skip_serializing_if = "std::option::Option::is_none")]
    pub cursor: std::option::Option<SmolStr>,
    pub records: Vec<Record>,
}

#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub cid: SmolStr,
    pub uri: SmolStr,
    pub value: serde_json::Value,
}

/// Response type for
///com.atproto.repo.listRecords
pub struct ListRecordsResponse;

impl XrpcResp for ListRecordsResponse {
    const NSID: &'static str = "com.atproto.repo.listRecords";
    const ENCODING: &'static str = "application/json";
    type Output = ListRecordsOutput;
}

impl XrpcRequest for ListRecords {
    const NSID: &'static str = "com.atproto.repo.listRecords";
    const METHOD: XrpcMethod = XrpcMethod::Query;
    const AUTH: AuthRequirement = AuthRequirement::Optional;

    type Response = ListRecordsResponse;

    fn encode_query(&self) -> Result<QueryParams, EncodeError> {
        let mut query = QueryParams::new();
        query
            .push("repo", &self.repo)
            .push("collection", &self.collection)
            .push_bounded("limit", self.limit, LIMIT)
            .push_opt("cursor", self.cursor.as_ref())
            .push_opt("reverse", self.reverse);
        Ok(query)
    }
}

impl CursorRequest for ListRecords {
    type Item = Record;

    fn set_cursor(&mut self, cursor: Option<SmolStr>) {
        self.cursor = cursor;
    }

    fn into_page(output: ListRecordsOutput) -> Page<Record> {
        Page {
            cursor: output.cursor,
            items: output.records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_limit_is_omitted() {
        let req = ListRecords::new()
            .repo("did:plc:alice")
            .collection("app.bsky.feed.post")
            .build();
        assert_eq!(
            req.encode_query().unwrap().encode(),
            "repo=did%3Aplc%3Aalice&collection=app.bsky.feed.post"
        );
    }

    #[test]
    fn limit_cursor_and_reverse_are_encoded() {
        let req = ListRecords::new()
            .repo("alice.test")
            .collection("app.bsky.feed.like")
            .limit(500)
            .cursor("3k2")
            .reverse(true)
            .build();
        assert_eq!(
            req.encode_query().unwrap().encode(),
            "repo=alice.test&collection=app.bsky.feed.like&limit=100&cursor=3k2&reverse=true"
        );
    }

    #[test]
    fn records_keep_arbitrary_values() {
        let output: ListRecordsOutput = serde_json::from_value(serde_json::json!({
            "records": [{
                "uri": "at://did:plc:alice/app.bsky.feed.post/1",
                "cid": "bafyreia",
                "value": {"$type": "app.bsky.feed.post", "text": "hi"}
            }]
        }))
        .unwrap();
        let page = ListRecords::into_page(output);
        assert!(!page.has_more());
        assert_eq!(page.items[0].value["text"], "hi");
    }
}
