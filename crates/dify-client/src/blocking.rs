//! Synchronous access to the client.
//!
//! Each call builds a single-threaded tokio runtime, drives one operation to
//! completion on it and tears it down. No state survives between calls
//! apart from the client's configuration.

use std::fmt;
use std::future::Future;

use futures::StreamExt;
use tokio::runtime::{Builder, Runtime};

use crate::client::DifyClient;
use crate::error::{Error, Result};
use crate::request::Request;
use crate::stream::EventStream;
use crate::types::{Payload, StreamedEvent};

/// Blocking wrapper around [`DifyClient`].
///
/// Built with [`ClientBuilder::build_blocking`](crate::ClientBuilder::build_blocking).
/// Must not be used from inside an async runtime; such calls fail with
/// [`Error::Config`].
///
/// ```no_run
/// use dify_client::{DifyClient, ListDatasetsQuery};
///
/// # fn example() -> dify_client::Result<()> {
/// let client = DifyClient::builder()
///     .api_key("app-...")
///     .build_blocking()?;
///
/// let datasets = client.run(|client| async move {
///     client.datasets().list(&ListDatasetsQuery::default()).await
/// })?;
/// println!("{datasets}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BlockingClient {
    client: DifyClient,
}

impl BlockingClient {
    pub(crate) fn new(client: DifyClient) -> Self {
        Self { client }
    }

    /// The underlying async client.
    pub fn async_client(&self) -> &DifyClient {
        &self.client
    }

    /// Drive any async operation on the client to completion.
    pub fn run<F, Fut, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(DifyClient) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let runtime = call_runtime()?;
        runtime.block_on(f(self.client.clone()))
    }

    /// Blocking [`DifyClient::execute`].
    pub fn execute(&self, request: Request) -> Result<Payload> {
        self.run(|client| async move { client.execute(request).await })
    }

    /// Blocking [`DifyClient::stream`].
    ///
    /// The returned iterator owns the runtime that drives the connection.
    pub fn stream(&self, request: Request) -> Result<BlockingEventStream> {
        let runtime = call_runtime()?;
        let events = runtime.block_on(self.client.stream(request))?;
        Ok(BlockingEventStream { events, runtime })
    }
}

impl fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingClient")
            .field("base_url", &self.client.base_url().as_str())
            .finish()
    }
}

/// Iterator over a server-sent event stream.
///
/// Dropping it closes the connection and shuts down its runtime.
pub struct BlockingEventStream {
    // Declared first so the stream is dropped while the runtime is alive.
    events: EventStream,
    runtime: Runtime,
}

impl Iterator for BlockingEventStream {
    type Item = Result<StreamedEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.events.next())
    }
}

impl fmt::Debug for BlockingEventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingEventStream").finish_non_exhaustive()
    }
}

fn call_runtime() -> Result<Runtime> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(Error::Config(
            "blocking client used inside an async runtime; use DifyClient instead".to_string(),
        ));
    }
    Ok(Builder::new_current_thread().enable_all().build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientBuilder;

    fn blocking() -> BlockingClient {
        ClientBuilder::new()
            .base_url("http://127.0.0.1:9")
            .api_key("k")
            .build_blocking()
            .unwrap()
    }

    #[test]
    fn test_runs_outside_runtime() {
        let client = blocking();
        let value = client.run(|_| async { Ok(42) }).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_config_errors_surface_unchanged() {
        let client = blocking();
        let err = client
            .execute(Request::get("/v1/datasets").scope(crate::Scope::Dataset))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(!client.async_client().is_connected());
    }

    #[tokio::test]
    async fn test_rejects_use_inside_runtime() {
        let client = blocking();
        let err = client.execute(Request::get("/v1/app/meta")).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.contains("async runtime")));
    }
}
