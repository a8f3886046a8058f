//! Server-sent event streaming.
//!
//! Only connection establishment is retried. Once the server has answered
//! with 2xx, events are yielded as they arrive. Each wait for the next event
//! is bounded by the per-attempt timeout. A failure or stall after that point
//! ends the stream with a single error and is not replayed on a new
//! connection, so a caller that reconnects receives a fresh sequence starting
//! from the server's first event.

use std::pin::Pin;

use eventsource_stream::{EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderValue, ACCEPT};

use crate::client::{server_request_id, DifyClient, PreparedRequest};
use crate::error::{Error, Result};
use crate::request::Request;
use crate::retry;
use crate::types::{Payload, StreamedEvent};

/// Events from one streaming call.
///
/// Dropping the stream closes its connection.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamedEvent>> + Send>>;

impl DifyClient {
    /// Open a server-sent event stream.
    ///
    /// Resolves once the server has answered. Non-2xx answers are classified
    /// like [`execute`](Self::execute) and never retried; timeouts and
    /// connection failures before that are retried with backoff. The
    /// per-attempt timeout bounds connection establishment and each wait for
    /// the next event, not the stream as a whole.
    pub async fn stream(&self, request: Request) -> Result<EventStream> {
        let prepared = self.prepare(request)?;
        let http = self.http().await?;

        let response = {
            let prepared = &prepared;
            retry::with_retry(
                prepared.policy,
                self.sleeper(),
                &prepared.request_id,
                move |attempt| open_once(http, prepared, attempt),
            )
            .await?
        };

        let request_id = server_request_id(response.headers()).unwrap_or(prepared.request_id);
        tracing::debug!(
            status = response.status().as_u16(),
            request_id = %request_id,
            "Event stream opened"
        );

        let idle = prepared.timeout;
        let events = response.bytes_stream().eventsource();
        let stream = async_stream::stream! {
            let mut events = std::pin::pin!(events);
            let mut received = 0u64;
            loop {
                // A silent server ends the stream after `idle`.
                let item = match tokio::time::timeout(idle, events.next()).await {
                    Ok(Some(item)) => item,
                    Ok(None) => break,
                    Err(_) => {
                        tracing::warn!(
                            request_id = %request_id,
                            received,
                            idle_ms = idle.as_millis() as u64,
                            "Event stream stalled"
                        );
                        yield Err(Error::timed_out(idle));
                        break;
                    }
                };
                match item {
                    Ok(event) => {
                        received += 1;
                        yield Ok(StreamedEvent::from(event));
                    }
                    Err(e) => {
                        tracing::warn!(
                            request_id = %request_id,
                            received,
                            error = %e,
                            "Event stream failed"
                        );
                        yield Err(stream_error(e));
                        break;
                    }
                }
            }
            tracing::debug!(request_id = %request_id, received, "Event stream finished");
        };

        Ok(Box::pin(stream))
    }
}

/// Make one connection attempt and check the status.
async fn open_once(
    http: &reqwest::Client,
    prepared: &PreparedRequest,
    attempt: u32,
) -> Result<reqwest::Response> {
    tracing::debug!(
        method = %prepared.method,
        url = %prepared.url,
        attempt = attempt + 1,
        max_attempts = prepared.policy.max_attempts(),
        request_id = %prepared.request_id,
        "Opening event stream"
    );

    let send = prepared
        .build(http)?
        .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
        .send();

    let response = match tokio::time::timeout(prepared.timeout, send).await {
        Ok(result) => result.map_err(|e| Error::from_transport(e, prepared.timeout))?,
        Err(_) => return Err(Error::timed_out(prepared.timeout)),
    };

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let request_id =
        server_request_id(response.headers()).unwrap_or_else(|| prepared.request_id.clone());
    let body = match tokio::time::timeout(prepared.timeout, response.text()).await {
        Ok(result) => result.map_err(|e| Error::from_transport(e, prepared.timeout))?,
        Err(_) => return Err(Error::timed_out(prepared.timeout)),
    };
    Err(Error::from_status(
        status.as_u16(),
        Payload::from_body(body),
        request_id,
    ))
}

fn stream_error(err: EventStreamError<reqwest::Error>) -> Error {
    match err {
        EventStreamError::Transport(e) => Error::Connection(e.to_string()),
        other => Error::Stream(other.to_string()),
    }
}
