//! Shared helpers for client integration tests.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use dify_client::{ClientBuilder, Credentials, DifyClient, Scope, Sleeper};
use wiremock::MockServer;

pub const APP_KEY: &str = "app-key";
pub const DATASET_KEY: &str = "dataset-key";
pub const WORKFLOW_KEY: &str = "workflow-key";
pub const CONFIG_KEY: &str = "config-key";

/// Records requested backoff delays without waiting.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        self.delays.lock().unwrap().push(delay);
    }
}

/// Builder pointed at `base_url` with every scope configured and backoff
/// recorded by `sleeper`.
pub fn builder(base_url: &str, sleeper: Arc<RecordingSleeper>) -> ClientBuilder {
    let credentials = Credentials::from_scopes([
        (Scope::Default, APP_KEY),
        (Scope::Dataset, DATASET_KEY),
        (Scope::Workflow, WORKFLOW_KEY),
        (Scope::App, CONFIG_KEY),
    ])
    .unwrap();

    DifyClient::builder()
        .base_url(base_url)
        .credentials(credentials)
        .timeout(Duration::from_secs(5))
        .retry_backoff(Duration::from_millis(100))
        .sleeper(sleeper)
}

/// Client for a mock server, with retries disabled.
pub fn client(server: &MockServer) -> DifyClient {
    builder(&server.uri(), Arc::new(RecordingSleeper::default()))
        .retries(0)
        .build()
        .unwrap()
}

/// Route retry logs to the test output. Filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A local address nothing is listening on.
pub fn unused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Server-sent event body with one block per `(event, data)` pair.
pub fn sse_body(events: &[(&str, &str)]) -> String {
    events
        .iter()
        .map(|(event, data)| format!("event: {event}\ndata: {data}\n\n"))
        .collect()
}
