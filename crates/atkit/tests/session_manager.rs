mod common;

use std::sync::Arc;

use atkit::api::chat_bsky::convo::add_reaction::AddReaction;
use atkit::api::com_atproto::repo::list_records::ListRecords;
use atkit::api::com_atproto::server::get_session::GetSession;
use atkit::error::ClientError;
use atkit::session::{CredentialStore, Credentials};
use atkit::xrpc::XrpcClient;
use common::{MockClient, PDS, alice, bearer, manager, session_body};
use http::{Method, StatusCode};

fn get_session_ok() -> serde_json::Value {
    serde_json::json!({"did": "did:plc:alice", "handle": "alice.test", "active": true})
}

#[tokio::test(flavor = "multi_thread")]
async fn login_then_expired_token_refreshes_and_retries() {
    let client = Arc::new(MockClient::default());
    let mut create = session_body("acc1", "ref1");
    create["didDoc"] = serde_json::json!({
        "id": "did:plc:alice",
        "service": [{
            "id": "#atproto_pds",
            "type": "AtprotoPersonalDataServer",
            "serviceEndpoint": PDS
        }]
    });
    client.push_json(StatusCode::OK, create).await;
    client
        .push_json(
            StatusCode::BAD_REQUEST,
            serde_json::json!({"error": "ExpiredToken", "message": "Token has expired"}),
        )
        .await;
    client
        .push_json(StatusCode::OK, session_body("acc2", "ref2"))
        .await;
    client.push_json(StatusCode::OK, get_session_ok()).await;

    let agent = manager(&client);
    let session = agent
        .login("alice.test", "app-password", "https://entryway.example")
        .await
        .unwrap();
    assert_eq!(session.did, "did:plc:alice");
    assert_eq!(session.service_endpoint.as_str(), "https://pds.alice.example/");

    let output = agent.send(GetSession).await.unwrap().into_output().unwrap();
    assert_eq!(output.handle, "alice.test");

    let log = client.take_log().await;
    assert_eq!(log.len(), 4);

    assert_eq!(log[0].method(), Method::POST);
    assert_eq!(
        log[0].uri().to_string(),
        "https://entryway.example/xrpc/com.atproto.server.createSession"
    );
    assert_eq!(bearer(&log[0]), None);
    let login_body: serde_json::Value = serde_json::from_slice(log[0].body()).unwrap();
    assert_eq!(login_body["identifier"], "alice.test");

    assert_eq!(
        log[1].uri().to_string(),
        "https://pds.alice.example/xrpc/com.atproto.server.getSession"
    );
    assert_eq!(bearer(&log[1]), Some("Bearer acc1"));

    assert_eq!(log[2].method(), Method::POST);
    assert_eq!(
        log[2].uri().to_string(),
        "https://pds.alice.example/xrpc/com.atproto.server.refreshSession"
    );
    assert_eq!(bearer(&log[2]), Some("Bearer ref1"));
    assert!(log[2].body().is_empty());
    assert!(log[2].headers().get(http::header::CONTENT_TYPE).is_none());

    assert_eq!(bearer(&log[3]), Some("Bearer acc2"));

    assert_eq!(
        agent.store().get("did:plc:alice").await.unwrap(),
        Some(Credentials::new("acc2", "ref2"))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn login_without_did_doc_uses_given_pds() {
    let client = Arc::new(MockClient::default());
    client
        .push_json(StatusCode::OK, session_body("acc1", "ref1"))
        .await;

    let agent = manager(&client);
    let session = agent.login("alice.test", "pw", PDS).await.unwrap();
    assert_eq!(session, alice());
    assert_eq!(agent.active_session().await.unwrap(), alice());
    assert_eq!(agent.access_token().await.unwrap().unwrap().as_str(), "acc1");
}

#[tokio::test(flavor = "multi_thread")]
async fn login_rejects_bad_pds_without_io() {
    let client = Arc::new(MockClient::default());
    let agent = manager(&client);
    let err = agent.login("alice.test", "pw", "not a url").await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidRequestUrl { .. }));
    assert!(client.take_log().await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_failure_returns_original_error_and_keeps_credentials() {
    let client = Arc::new(MockClient::default());
    client
        .push_json(
            StatusCode::UNAUTHORIZED,
            serde_json::json!({"error": "AuthRequired", "message": "bad token"}),
        )
        .await;
    client
        .push_json(
            StatusCode::BAD_REQUEST,
            serde_json::json!({"error": "ExpiredToken", "message": "refresh expired"}),
        )
        .await;

    let agent = manager(&client);
    agent
        .restore(alice(), Credentials::new("acc1", "ref1"))
        .await
        .unwrap();

    match agent.send(GetSession).await.unwrap_err() {
        ClientError::Api(e) => {
            assert_eq!(e.error, "AuthRequired");
            assert_eq!(e.status, StatusCode::UNAUTHORIZED);
            assert_eq!(e.nsid, "com.atproto.server.getSession");
        }
        other => panic!("unexpected: {other:?}"),
    }

    assert_eq!(client.take_log().await.len(), 2);
    assert_eq!(
        agent.store().get("did:plc:alice").await.unwrap(),
        Some(Credentials::new("acc1", "ref1"))
    );
    assert_eq!(agent.active_session().await.unwrap(), alice());
}

#[tokio::test(flavor = "multi_thread")]
async fn other_rejections_are_not_retried() {
    let client = Arc::new(MockClient::default());
    client
        .push_json(
            StatusCode::BAD_REQUEST,
            serde_json::json!({"error": "InvalidRequest"}),
        )
        .await;

    let agent = manager(&client);
    agent
        .restore(alice(), Credentials::new("acc1", "ref1"))
        .await
        .unwrap();

    let err = agent.send(GetSession).await.unwrap_err();
    assert!(matches!(err, ClientError::Api(ref e) if e.error == "InvalidRequest"));
    assert_eq!(client.take_log().await.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn required_call_without_session_fails_before_io() {
    let client = Arc::new(MockClient::default());
    let agent = manager(&client);

    assert!(matches!(
        agent.send(GetSession).await,
        Err(ClientError::NoActiveSession)
    ));
    assert!(matches!(
        agent.active_session().await,
        Err(ClientError::NoActiveSession)
    ));
    assert!(matches!(
        agent.resolve_service_url(true).await,
        Err(ClientError::NoActiveSession)
    ));
    assert_eq!(
        agent.resolve_service_url(false).await.unwrap().as_str(),
        "https://public.api.bsky.app/"
    );
    assert!(client.take_log().await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn optional_auth_follows_session_state() {
    let client = Arc::new(MockClient::default());
    let empty = serde_json::json!({"records": []});
    client.push_json(StatusCode::OK, empty.clone()).await;
    client.push_json(StatusCode::OK, empty).await;

    let agent = manager(&client);
    let request = ListRecords::new()
        .repo("did:plc:bob")
        .collection("app.bsky.feed.post")
        .build();

    agent.send(request.clone()).await.unwrap().into_output().unwrap();
    agent
        .restore(alice(), Credentials::new("acc1", "ref1"))
        .await
        .unwrap();
    agent.send(request).await.unwrap().into_output().unwrap();

    let log = client.take_log().await;
    assert!(
        log[0]
            .uri()
            .to_string()
            .starts_with("https://public.api.bsky.app/xrpc/com.atproto.repo.listRecords?")
    );
    assert_eq!(bearer(&log[0]), None);
    assert!(
        log[1]
            .uri()
            .to_string()
            .starts_with("https://pds.alice.example/xrpc/com.atproto.repo.listRecords?")
    );
    assert_eq!(bearer(&log[1]), Some("Bearer acc1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn identical_reactions_are_both_sent() {
    let client = Arc::new(MockClient::default());
    let view = serde_json::json!({
        "message": {
            "id": "msg1",
            "rev": "r2",
            "text": "hi",
            "sender": {"did": "did:plc:bob"},
            "sentAt": "2024-01-01T00:00:00Z",
            "reactions": [{"value": "🎉", "sender": {"did": "did:plc:alice"}, "createdAt": "2024-01-01T00:01:00Z"}]
        }
    });
    client.push_json(StatusCode::OK, view.clone()).await;
    client.push_json(StatusCode::OK, view).await;

    let agent = manager(&client);
    agent
        .restore(alice(), Credentials::new("acc1", "ref1"))
        .await
        .unwrap();

    let reaction = AddReaction::new()
        .convo_id("convo1")
        .message_id("msg1")
        .value("🎉")
        .build();
    for _ in 0..2 {
        let output = agent
            .send(reaction.clone())
            .await
            .unwrap()
            .into_output()
            .unwrap();
        assert_eq!(output.message.reactions.map(|r| r.len()), Some(1));
    }

    let log = client.take_log().await;
    assert_eq!(log.len(), 2);
    for request in &log {
        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.uri().to_string(),
            "https://pds.alice.example/xrpc/chat.bsky.convo.addReaction"
        );
        assert_eq!(
            request.headers()["atproto-proxy"],
            "did:web:api.bsky.chat#bsky_chat"
        );
        assert_eq!(request.headers()[http::header::CONTENT_TYPE], "application/json");
        assert_eq!(bearer(request), Some("Bearer acc1"));
    }
    assert_eq!(log[0].body(), log[1].body());
}

#[tokio::test(flavor = "multi_thread")]
async fn logout_and_switch() {
    let client = Arc::new(MockClient::default());
    let agent = manager(&client);
    agent
        .restore(alice(), Credentials::new("acc1", "ref1"))
        .await
        .unwrap();

    let bob = atkit::client::Session::new("did:plc:bob", "bob.test", "https://pds.bob.example")
        .unwrap();
    assert!(matches!(
        agent.switch_session(bob.clone()).await,
        Err(ClientError::NoActiveSession)
    ));
    assert_eq!(agent.active_session().await.unwrap(), alice());

    agent
        .store()
        .set("did:plc:bob", Credentials::new("bacc", "bref"))
        .await
        .unwrap();
    agent.switch_session(bob.clone()).await.unwrap();
    assert_eq!(agent.active_session().await.unwrap(), bob);
    assert_eq!(agent.access_token().await.unwrap().unwrap().as_str(), "bacc");

    agent.logout().await.unwrap();
    assert!(matches!(
        agent.active_session().await,
        Err(ClientError::NoActiveSession)
    ));
    assert!(agent.store().get("did:plc:bob").await.unwrap().is_none());
    assert!(agent.store().get("did:plc:alice").await.unwrap().is_some());
    agent.logout().await.unwrap();
    assert!(client.take_log().await.is_empty());
}
