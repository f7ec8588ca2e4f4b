//! # atkit
//!
//! An AT Protocol XRPC client core: session handling with single-flight token
//! refresh, typed endpoint bindings, and cursor pagination.
//!
//! ## Example
//!
//! Sign in with an app password, then page through a repository's records.
//!
//! ```no_run
//! use atkit::api::com_atproto::repo::list_records::ListRecords;
//! use atkit::client::{ClientOptions, SessionManager};
//! use atkit::xrpc::paginate;
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> miette::Result<()> {
//!     let agent = SessionManager::with_options(ClientOptions::new().build())?;
//!     let session = agent
//!         .login("alice.bsky.social", "app-password", "https://bsky.social")
//!         .await?;
//!
//!     let request = ListRecords::new()
//!         .repo(session.did.clone())
//!         .collection("app.bsky.feed.post")
//!         .limit(50)
//!         .build();
//!     let mut records = std::pin::pin!(paginate(&agent, request));
//!     while let Some(record) = records.next().await {
//!         println!("{}", record?.uri);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Stateful session handling and client configuration
pub mod client;

/// Lexicon endpoint bindings
pub use atkit_api as api;

pub use atkit_common::*;
