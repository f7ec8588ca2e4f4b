pub mod convo;

/// `atproto-proxy` target of the Bluesky chat service.
pub const CHAT_SERVICE_PROXY: &str = "did:web:api.bsky.chat#bsky_chat";
