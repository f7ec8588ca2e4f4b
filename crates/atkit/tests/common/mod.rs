#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use atkit::client::{ClientOptions, Session, SessionManager};
use atkit::http_client::HttpClient;
use atkit::session::MemoryCredentialStore;
use http::{Response as HttpResponse, StatusCode};
use tokio::sync::Mutex;

pub const PDS: &str = "https://pds.alice.example";

#[derive(Clone, Default)]
pub struct MockClient {
    // Queue of HTTP responses to pop for each send_http call
    queue: Arc<Mutex<VecDeque<HttpResponse<Vec<u8>>>>>,
    // Capture requests for assertions
    log: Arc<Mutex<Vec<http::Request<Vec<u8>>>>>,
}

impl MockClient {
    pub async fn push(&self, resp: HttpResponse<Vec<u8>>) {
        self.queue.lock().await.push_back(resp);
    }

    pub async fn push_json(&self, status: StatusCode, body: serde_json::Value) {
        self.push(json_response(status, body)).await;
    }

    pub async fn take_log(&self) -> Vec<http::Request<Vec<u8>>> {
        std::mem::take(&mut *self.log.lock().await)
    }
}

impl HttpClient for MockClient {
    type Error = std::convert::Infallible;

    fn send_http(
        &self,
        request: http::Request<Vec<u8>>,
    ) -> impl core::future::Future<
        Output = core::result::Result<http::Response<Vec<u8>>, Self::Error>,
    > + Send {
        let log = self.log.clone();
        let queue = self.queue.clone();
        async move {
            log.lock().await.push(request);
            Ok(queue.lock().await.pop_front().expect("no queued response"))
        }
    }
}

pub fn json_response(status: StatusCode, body: serde_json::Value) -> HttpResponse<Vec<u8>> {
    HttpResponse::builder()
        .status(status)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(&body).unwrap())
        .unwrap()
}

pub fn session_body(access: &str, refresh: &str) -> serde_json::Value {
    serde_json::json!({
        "accessJwt": access,
        "refreshJwt": refresh,
        "did": "did:plc:alice",
        "handle": "alice.test"
    })
}

pub fn alice() -> Session {
    Session::new("did:plc:alice", "alice.test", PDS).unwrap()
}

pub fn manager(client: &Arc<MockClient>) -> SessionManager<MemoryCredentialStore, MockClient> {
    SessionManager::new(
        client.clone(),
        Arc::new(MemoryCredentialStore::default()),
        ClientOptions::default(),
    )
    .unwrap()
}

pub fn bearer(request: &http::Request<Vec<u8>>) -> Option<&str> {
    request
        .headers()
        .get(http::header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap())
}
