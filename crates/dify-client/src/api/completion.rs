//! Text completion API.

use crate::client::DifyClient;
use crate::endpoints::{self, fill};
use crate::error::Result;
use crate::request::Request;
use crate::stream::EventStream;
use crate::types::{CompletionRequest, Payload, ResponseMode};

/// Completion API client for non-conversational generation.
pub struct CompletionApi {
    client: DifyClient,
}

impl CompletionApi {
    pub(crate) fn new(client: DifyClient) -> Self {
        Self { client }
    }

    /// Generate text and wait for the result.
    pub async fn send(&self, mut request: CompletionRequest) -> Result<Payload> {
        request.response_mode = ResponseMode::Blocking;
        self.client
            .execute(Request::post(endpoints::COMPLETION_MESSAGES).json(&request)?)
            .await
    }

    /// Generate text as a stream of events.
    pub async fn stream(&self, mut request: CompletionRequest) -> Result<EventStream> {
        request.response_mode = ResponseMode::Streaming;
        self.client
            .stream(Request::post(endpoints::COMPLETION_MESSAGES_STREAM).json(&request)?)
            .await
    }

    /// Stop a running generation.
    pub async fn stop(&self, message_id: &str) -> Result<Payload> {
        let path = fill(endpoints::COMPLETION_MESSAGE_STOP, &[("message_id", message_id)])?;
        self.client.execute(Request::post(path)).await
    }
}
