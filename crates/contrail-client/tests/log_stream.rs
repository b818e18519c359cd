//! Live log streaming against a mock SSE server.

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use contrail_client::{ConcourseClient, Error, LogStream, LogStreamState, StreamFailure};
use contrail_session::{InMemoryTargetStore, SharedTargetStore, TargetStore};
use contrail_types::{Target, Token};

async fn client_for(server: &MockServer) -> ConcourseClient {
    ConcourseClient::builder()
        .base_url(server.uri())
        .build()
        .unwrap()
}

fn target_for(server: &MockServer) -> Target {
    Target::new("prod", server.uri(), "main", Token::new("session-token"))
}

fn sse_body(frames: &[&str]) -> String {
    frames.concat()
}

#[tokio::test]
async fn delivers_stripped_batches_then_closes_on_end_event() {
    let server = MockServer::start().await;
    let body = sse_body(&[
        "event: log\ndata: [{\"payload\":\"\\u001b[32mstep one ok\\u001b[0m\"}]\n\n",
        "event: log\ndata: [{\"payload\":\"step two\"},{\"payload\":\"step three\"}]\n\n",
        "event: end\ndata: {}\n\n",
    ]);
    Mock::given(method("GET"))
        .and(path("/api/v1/builds/42/events"))
        .and(header("Authorization", "Bearer session-token"))
        .and(header("Accept", "text/event-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let store: SharedTargetStore = Arc::new(InMemoryTargetStore::new());
    let mut stream = LogStream::new(client, target_for(&server), 42, store);
    let mut state = stream.watch_state();

    let mut batches = stream.start().unwrap();

    let first = batches.recv().await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].payload, "step one ok");

    let second = batches.recv().await.unwrap();
    assert_eq!(second.len(), 2);
    assert_eq!(second[0].payload, "step two");
    assert_eq!(second[1].payload, "step three");

    assert!(batches.recv().await.is_none());
    state
        .wait_for(|s| *s == LogStreamState::Closed)
        .await
        .unwrap();
}

#[tokio::test]
async fn server_close_without_end_event_is_normal_completion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/builds/7/events"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "event: log\ndata: [{\"payload\":\"only line\"}]\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let store: SharedTargetStore = Arc::new(InMemoryTargetStore::new());
    let mut stream = LogStream::new(client, target_for(&server), 7, store);
    let mut state = stream.watch_state();

    let mut batches = stream.start().unwrap();
    assert_eq!(batches.recv().await.unwrap()[0].payload, "only line");
    assert!(batches.recv().await.is_none());
    state
        .wait_for(|s| *s == LogStreamState::Closed)
        .await
        .unwrap();
}

#[tokio::test]
async fn unauthorized_failure_invalidates_stored_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/builds/42/events"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let target = target_for(&server);
    let store: SharedTargetStore = Arc::new(InMemoryTargetStore::with_target(target.clone()));
    assert!(store.load().await.unwrap().is_some());

    let mut stream = LogStream::new(client, target, 42, store.clone());
    let mut state = stream.watch_state();
    let mut batches = stream.start().unwrap();

    state
        .wait_for(|s| matches!(*s, LogStreamState::Failed(_)))
        .await
        .unwrap();
    assert_eq!(
        stream.state(),
        LogStreamState::Failed(StreamFailure::Unauthorized)
    );

    // The session is gone; the caller must route back to the entry flow.
    assert!(store.load().await.unwrap().is_none());
    assert!(batches.recv().await.is_none());
}

#[tokio::test]
async fn transport_failure_leaves_target_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/builds/42/events"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let target = target_for(&server);
    let store: SharedTargetStore = Arc::new(InMemoryTargetStore::with_target(target.clone()));

    let mut stream = LogStream::new(client, target, 42, store.clone());
    let mut state = stream.watch_state();
    let _batches = stream.start().unwrap();

    state
        .wait_for(|s| matches!(*s, LogStreamState::Failed(_)))
        .await
        .unwrap();
    assert_eq!(
        stream.state(),
        LogStreamState::Failed(StreamFailure::Transport)
    );
    assert!(store.load().await.unwrap().is_some());
}

#[tokio::test]
async fn malformed_frame_is_a_transport_failure() {
    let server = MockServer::start().await;
    // Frame data is not array-shaped.
    Mock::given(method("GET"))
        .and(path("/api/v1/builds/42/events"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "event: log\ndata: {\"payload\":\"not a batch\"}\n\n",
            "text/event-stream",
        ))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let target = target_for(&server);
    let store: SharedTargetStore = Arc::new(InMemoryTargetStore::with_target(target.clone()));

    let mut stream = LogStream::new(client, target, 42, store.clone());
    let mut state = stream.watch_state();
    let _batches = stream.start().unwrap();

    state
        .wait_for(|s| matches!(*s, LogStreamState::Failed(_)))
        .await
        .unwrap();
    assert_eq!(
        stream.state(),
        LogStreamState::Failed(StreamFailure::Transport)
    );
    assert!(store.load().await.unwrap().is_some());
}

#[tokio::test]
async fn start_is_rejected_outside_idle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/builds/42/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("event: end\ndata: {}\n\n", "text/event-stream")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let store: SharedTargetStore = Arc::new(InMemoryTargetStore::new());
    let mut stream = LogStream::new(client, target_for(&server), 42, store);

    let _batches = stream.start().unwrap();
    assert!(matches!(stream.start(), Err(Error::AlreadyStarted)));

    stream.stop();
    // A stopped stream is not restartable either.
    assert!(matches!(stream.start(), Err(Error::AlreadyStarted)));
}

#[tokio::test]
async fn batches_buffered_before_stop_are_not_delivered() {
    let server = MockServer::start().await;
    let body = sse_body(&[
        "event: log\ndata: [{\"payload\":\"buffered one\"}]\n\n",
        "event: log\ndata: [{\"payload\":\"buffered two\"}]\n\n",
        "event: end\ndata: {}\n\n",
    ]);
    Mock::given(method("GET"))
        .and(path("/api/v1/builds/42/events"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let store: SharedTargetStore = Arc::new(InMemoryTargetStore::new());
    let mut stream = LogStream::new(client, target_for(&server), 42, store);
    let mut state = stream.watch_state();

    let mut batches = stream.start().unwrap();

    // Let the reader drain the whole response into the channel without
    // consuming anything, then cancel.
    state
        .wait_for(|s| *s == LogStreamState::Closed)
        .await
        .unwrap();
    stream.stop();

    assert!(batches.recv().await.is_none());
}

#[tokio::test]
async fn stop_releases_the_channel_and_halts_delivery() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/builds/42/events"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(
                    "event: log\ndata: [{\"payload\":\"never seen\"}]\n\n",
                    "text/event-stream",
                )
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let store: SharedTargetStore = Arc::new(InMemoryTargetStore::new());
    let mut stream = LogStream::new(client, target_for(&server), 42, store);

    let mut batches = stream.start().unwrap();
    stream.stop();

    assert_eq!(stream.state(), LogStreamState::Closed);
    assert!(batches.recv().await.is_none());
}
