//! Lexicon bindings for the endpoints atkit speaks.
//!
//! Each endpoint module carries its request shape (implementing
//! [`XrpcRequest`](atkit_common::xrpc::XrpcRequest)), a response marker and
//! the typed output. Bindings only declare what they need; URLs, auth headers
//! and retries come from the client they are sent through.

#[cfg(feature = "chat_bsky")]
pub mod chat_bsky;

#[cfg(feature = "com_atproto")]
pub mod com_atproto;
