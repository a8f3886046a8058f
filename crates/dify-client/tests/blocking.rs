//! Blocking client integration tests.
//!
//! The mock server runs on its own runtime so the test thread stays free of
//! any async context.

mod common;

use std::sync::Arc;

use dify_client::{
    BlockingClient, Error, ListDatasetsQuery, Payload, Request, StreamedEvent,
};
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{builder, sse_body, RecordingSleeper, DATASET_KEY};

fn start_server(runtime: &Runtime, mocks: Vec<Mock>) -> MockServer {
    runtime.block_on(async {
        let server = MockServer::start().await;
        for mock in mocks {
            mock.mount(&server).await;
        }
        server
    })
}

fn blocking_client(server: &MockServer) -> BlockingClient {
    builder(&server.uri(), Arc::new(RecordingSleeper::default()))
        .retries(0)
        .build_blocking()
        .unwrap()
}

#[test]
fn test_execute_blocks_until_result() {
    let runtime = Runtime::new().unwrap();
    let server = start_server(
        &runtime,
        vec![Mock::given(method("GET"))
            .and(path("/v1/app/meta"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tool_icons": {}})))],
    );

    let client = blocking_client(&server);
    let payload = client.execute(Request::get("/v1/app/meta")).unwrap();
    assert_eq!(payload, Payload::Json(json!({"tool_icons": {}})));
}

#[test]
fn test_sequential_calls_each_get_a_fresh_runtime() {
    let runtime = Runtime::new().unwrap();
    let server = start_server(
        &runtime,
        vec![Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(3)],
    );

    let client = blocking_client(&server);
    for _ in 0..3 {
        let payload = client.execute(Request::get("/v1/app/meta")).unwrap();
        assert_eq!(payload, Payload::Json(json!({"ok": true})));
    }
}

#[test]
fn test_errors_are_identical_to_async_path() {
    let runtime = Runtime::new().unwrap();
    let server = start_server(
        &runtime,
        vec![Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401)
                    .insert_header("x-request-id", "srv-401")
                    .set_body_json(json!({"message": "invalid key"})),
            )
            .expect(1)],
    );

    let err = blocking_client(&server)
        .execute(Request::get("/v1/app/meta"))
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(_)), "got {err:?}");
    assert_eq!(err.request_id(), Some("srv-401"));
}

#[test]
fn test_run_drives_facade_calls() {
    let runtime = Runtime::new().unwrap();
    let server = start_server(
        &runtime,
        vec![Mock::given(method("GET"))
            .and(path("/v1/datasets"))
            .and(header("authorization", format!("Bearer {DATASET_KEY}").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [], "total": 0})))
            .expect(1)],
    );

    let client = blocking_client(&server);
    let payload = client
        .run(|client| async move { client.datasets().list(&ListDatasetsQuery::default()).await })
        .unwrap();
    assert_eq!(payload.as_json().unwrap()["total"], 0);
}

#[test]
fn test_stream_iterates_events() {
    let runtime = Runtime::new().unwrap();
    let server = start_server(
        &runtime,
        vec![Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                sse_body(&[("message", "a"), ("message", "b"), ("message_end", "{}")]),
                "text/event-stream",
            ))],
    );

    let events: Vec<StreamedEvent> = blocking_client(&server)
        .stream(Request::post("/v1/chat-messages"))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    let labels: Vec<_> = events.iter().map(|e| (e.event.as_str(), e.data.as_str())).collect();
    assert_eq!(
        labels,
        vec![("message", "a"), ("message", "b"), ("message_end", "{}")]
    );
}
