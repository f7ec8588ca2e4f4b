mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use atkit::api::com_atproto::server::get_session::GetSession;
use atkit::client::{ClientOptions, SessionManager};
use atkit::http_client::HttpClient;
use atkit::session::{CredentialStore, Credentials, MemoryCredentialStore};
use atkit::xrpc::XrpcClient;
use common::{alice, bearer, json_response, session_body};
use http::StatusCode;
use tokio::sync::Barrier;

const CALLERS: usize = 8;

/// Rejects the first token until every caller has been rejected, then
/// serves the rotated token.
struct RotatingServer {
    stale_gate: Barrier,
    refreshes: AtomicUsize,
    stale_calls: AtomicUsize,
    fresh_calls: AtomicUsize,
}

impl Default for RotatingServer {
    fn default() -> Self {
        Self {
            stale_gate: Barrier::new(CALLERS),
            refreshes: AtomicUsize::new(0),
            stale_calls: AtomicUsize::new(0),
            fresh_calls: AtomicUsize::new(0),
        }
    }
}

impl HttpClient for RotatingServer {
    type Error = std::convert::Infallible;

    async fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> Result<http::Response<Vec<u8>>, Self::Error> {
        let path = request.uri().path().to_owned();
        let auth = bearer(&request).map(str::to_owned);
        let response = match (path.as_str(), auth.as_deref()) {
            ("/xrpc/com.atproto.server.refreshSession", Some("Bearer ref1")) => {
                self.refreshes.fetch_add(1, Ordering::SeqCst);
                json_response(StatusCode::OK, session_body("acc2", "ref2"))
            }
            ("/xrpc/com.atproto.server.getSession", Some("Bearer acc1")) => {
                self.stale_calls.fetch_add(1, Ordering::SeqCst);
                self.stale_gate.wait().await;
                json_response(
                    StatusCode::UNAUTHORIZED,
                    serde_json::json!({"error": "ExpiredToken"}),
                )
            }
            ("/xrpc/com.atproto.server.getSession", Some("Bearer acc2")) => {
                self.fresh_calls.fetch_add(1, Ordering::SeqCst);
                json_response(
                    StatusCode::OK,
                    serde_json::json!({"did": "did:plc:alice", "handle": "alice.test"}),
                )
            }
            other => json_response(
                StatusCode::BAD_REQUEST,
                serde_json::json!({"error": "Unexpected", "message": format!("{other:?}")}),
            ),
        };
        Ok(response)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn simultaneous_rejections_share_one_refresh() {
    let server = Arc::new(RotatingServer::default());
    let agent = Arc::new(
        SessionManager::new(
            server.clone(),
            Arc::new(MemoryCredentialStore::default()),
            ClientOptions::default(),
        )
        .unwrap(),
    );
    agent
        .restore(alice(), Credentials::new("acc1", "ref1"))
        .await
        .unwrap();

    let mut tasks = Vec::new();
    for _ in 0..CALLERS {
        let agent = agent.clone();
        tasks.push(tokio::spawn(async move {
            agent.send(GetSession).await?.into_output()
        }));
    }
    for task in tasks {
        let output = task.await.unwrap().unwrap();
        assert_eq!(output.did, "did:plc:alice");
    }

    assert_eq!(server.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(server.stale_calls.load(Ordering::SeqCst), CALLERS);
    assert_eq!(server.fresh_calls.load(Ordering::SeqCst), CALLERS);
    assert_eq!(
        agent.store().get("did:plc:alice").await.unwrap(),
        Some(Credentials::new("acc2", "ref2"))
    );
}
