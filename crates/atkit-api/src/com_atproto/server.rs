pub mod create_session;
pub mod get_session;
pub mod refresh_session;

use atkit_common::url::Url;

/// Extract the `AtprotoPersonalDataServer` service endpoint from a DID document.
///
/// Accepts the endpoint as a string or as an object with a `url` field.
pub fn pds_endpoint(did_doc: &serde_json::Value) -> Option<Url> {
    did_doc
        .get("service")?
        .as_array()?
        .iter()
        .find_map(|service| {
            if service.get("type")?.as_str()? != "AtprotoPersonalDataServer" {
                return None;
            }
            let endpoint = service.get("serviceEndpoint")?;
            let raw = endpoint
                .as_str()
                .or_else(|| endpoint.get("url")?.as_str())?;
            Url::parse(raw).ok()
        })
}
