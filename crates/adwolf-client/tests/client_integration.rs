//! Integration tests against a mocked AdWolf backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use adwolf_client::{
    Anonymous, ChatClient, ChatController, Phase, StaticToken, ERROR_MARKER, GENERIC_ERROR,
};
use adwolf_core::{AdwolfError, Role};
use adwolf_protocol::StreamEvent;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HAPPY_STREAM: &str = "data: {\"type\": \"thread_created\", \"thread_id\": \"t1\"}\n\n\
data: {\"type\": \"text_delta\", \"content\": \"Merhaba\"}\n\n\
data: {\"type\": \"text_delta\", \"content\": \" dünya\"}\n\n\
data: {\"type\": \"done\", \"thread_id\": \"t1\", \"message_id\": \"\"}\n\n";

fn authed_client(server: &MockServer) -> ChatClient {
    ChatClient::new(server.uri(), Arc::new(StaticToken::new("sekret")))
}

async fn mount_thread_list(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/chat/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "threads": [{
                "id": "t1",
                "title": "Özet talebi",
                "message_count": 2,
                "last_message_at": "2025-06-01T10:00:00+00:00",
                "created_at": "2025-06-01T10:00:00+00:00"
            }],
            "total": 1
        })))
        .mount(server)
        .await;
}

// --- Transport reader ---

#[tokio::test]
async fn test_send_message_streams_parsed_events() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .and(header("authorization", "Bearer sekret"))
        .and(body_json(serde_json::json!({
            "message": "Özetle",
            "thread_id": null
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(HAPPY_STREAM.as_bytes().to_vec(), "text/event-stream"),
        )
        .mount(&server)
        .await;

    let client = authed_client(&server);
    let mut stream = client.send_message("Özetle", None).await.unwrap();

    let mut events = Vec::new();
    while let Some(item) = stream.next().await {
        events.push(item.unwrap());
    }

    assert_eq!(events.len(), 4);
    assert_eq!(
        events[0],
        StreamEvent::ThreadCreated {
            thread_id: "t1".to_string()
        }
    );
    assert!(matches!(events[3], StreamEvent::Done { .. }));
}

#[tokio::test]
async fn test_non_success_status_fails_before_streaming() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = authed_client(&server);
    let err = client.send_message("Özetle", None).await.unwrap_err();
    match err {
        AdwolfError::Http { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unauthenticated_request_carries_no_bearer_header() {
    let server = MockServer::start().await;
    // Only matches requests WITH the header; an anonymous client must miss it.
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .and(header("authorization", "Bearer sekret"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            HAPPY_STREAM.as_bytes().to_vec(),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let client = ChatClient::new(server.uri(), Arc::new(Anonymous));
    let err = client.send_message("Özetle", None).await.unwrap_err();
    assert!(matches!(err, AdwolfError::Http { status: 404, .. }));
}

// --- Collaborator endpoints ---

#[tokio::test]
async fn test_list_threads() {
    let server = MockServer::start().await;
    mount_thread_list(&server).await;

    let client = authed_client(&server);
    let list = client.list_threads().await.unwrap();
    assert_eq!(list.total, 1);
    assert_eq!(list.threads[0].id, "t1");
    assert_eq!(list.threads[0].title, "Özet talebi");
}

#[tokio::test]
async fn test_thread_history() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chat/threads/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "thread": {"id": "t1", "title": "Özet talebi", "message_count": 2},
            "messages": [
                {"id": "m1", "thread_id": "t1", "role": "user", "content": "Özetle",
                 "created_at": "2025-06-01T10:00:00+00:00"},
                {"id": "m2", "thread_id": "t1", "role": "assistant", "content": "Merhaba dünya",
                 "created_at": "2025-06-01T10:00:05+00:00"}
            ]
        })))
        .mount(&server)
        .await;

    let client = authed_client(&server);
    let history = client.thread_history("t1").await.unwrap();
    assert_eq!(history.thread.id, "t1");
    assert_eq!(history.messages.len(), 2);
    assert_eq!(history.messages[1].role, Role::Assistant);
}

#[tokio::test]
async fn test_delete_thread() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/chat/threads/t1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = authed_client(&server);
    client.delete_thread("t1").await.unwrap();

    let err = client.delete_thread("missing").await.unwrap_err();
    assert!(matches!(err, AdwolfError::Http { status: 404, .. }));
}

// --- Controller end to end ---

#[tokio::test]
async fn test_controller_full_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(HAPPY_STREAM.as_bytes().to_vec(), "text/event-stream"),
        )
        .mount(&server)
        .await;
    mount_thread_list(&server).await;

    let mut controller = ChatController::new(authed_client(&server));

    let mut deltas = String::new();
    controller
        .send("Özetle", |event| {
            if let StreamEvent::TextDelta { content } = event {
                deltas.push_str(content);
            }
        })
        .await;

    assert_eq!(deltas, "Merhaba dünya");

    let session = controller.session();
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.thread_id(), Some("t1"));
    assert_eq!(session.messages().len(), 2);
    assert_eq!(session.messages()[1].content, "Merhaba dünya");

    // The done event triggered a thread-list refresh.
    assert_eq!(controller.threads().len(), 1);
    assert_eq!(controller.threads()[0].title, "Özet talebi");
}

#[tokio::test]
async fn test_controller_http_500_commits_generic_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut controller = ChatController::new(authed_client(&server));
    controller.send("Özetle", |_| {}).await;

    let session = controller.session();
    assert_eq!(session.phase(), Phase::Idle);
    assert_eq!(session.messages().len(), 2);
    let last = session.messages().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, format!("{ERROR_MARKER} {GENERIC_ERROR}"));
}

#[tokio::test]
async fn test_controller_stream_without_terminal_event_fails() {
    let server = MockServer::start().await;
    // Connection closes after one delta; no done/error frame.
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "data: {\"type\": \"text_delta\", \"content\": \"Veri\"}\n\n".as_bytes().to_vec(),
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let mut controller = ChatController::new(authed_client(&server));
    controller.send("rapor", |_| {}).await;

    let session = controller.session();
    assert_eq!(session.phase(), Phase::Idle);
    let last = session.messages().last().unwrap();
    assert!(last.content.starts_with(ERROR_MARKER));
    assert!(session.messages().iter().all(|m| m.content != "Veri"));
}

#[tokio::test]
async fn test_controller_open_and_delete_thread() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chat/threads/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "thread": {"id": "t1", "title": "Özet talebi", "message_count": 2},
            "messages": [
                {"id": "m1", "thread_id": "t1", "role": "user", "content": "Özetle",
                 "created_at": "2025-06-01T10:00:00+00:00"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/chat/threads/t1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let mut controller = ChatController::new(authed_client(&server));
    controller.open_thread("t1").await.unwrap();
    assert_eq!(controller.session().thread_id(), Some("t1"));
    assert_eq!(controller.session().messages().len(), 1);

    // Deleting the active thread resets to the new-thread state.
    controller.delete_thread("t1").await.unwrap();
    assert!(controller.session().thread_id().is_none());
    assert!(controller.session().messages().is_empty());
}
