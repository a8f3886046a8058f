//! Chat API.

use serde_json::json;

use crate::client::DifyClient;
use crate::endpoints::{self, fill};
use crate::error::Result;
use crate::request::{FilePart, Request};
use crate::stream::EventStream;
use crate::types::{ChatMessageRequest, Payload, ResponseMode};

use super::files::upload_request;

/// Chat API client.
pub struct ChatApi {
    client: DifyClient,
}

impl ChatApi {
    pub(crate) fn new(client: DifyClient) -> Self {
        Self { client }
    }

    /// Send a chat message and wait for the full answer.
    pub async fn send(&self, mut request: ChatMessageRequest) -> Result<Payload> {
        request.response_mode = ResponseMode::Blocking;
        self.client
            .execute(Request::post(endpoints::CHAT_MESSAGES).json(&request)?)
            .await
    }

    /// Send a chat message and stream the answer as it is generated.
    pub async fn stream(&self, mut request: ChatMessageRequest) -> Result<EventStream> {
        request.response_mode = ResponseMode::Streaming;
        self.client
            .stream(Request::post(endpoints::CHAT_MESSAGES).json(&request)?)
            .await
    }

    /// Get the messages of a conversation.
    pub async fn get(&self, conversation_id: &str) -> Result<Payload> {
        let path = fill(endpoints::CHAT_MESSAGE, &[("conversation_id", conversation_id)])?;
        self.client.execute(Request::get(path)).await
    }

    /// Stop a streaming generation.
    pub async fn stop(&self, task_id: &str, user: &str) -> Result<Payload> {
        let path = fill(endpoints::CHAT_MESSAGE_STOP, &[("task_id", task_id)])?;
        self.client
            .execute(Request::post(path).json_value(json!({ "user": user })))
            .await
    }

    /// Suggested follow-up questions for a message.
    pub async fn suggested_questions(&self, message_id: &str, user: Option<&str>) -> Result<Payload> {
        let path = fill(endpoints::CHAT_SUGGESTED_QUESTIONS, &[("message_id", message_id)])?;
        self.client
            .execute(Request::get(path).query_opt("user", user))
            .await
    }

    /// Upload a file to attach to chat messages.
    pub async fn upload_file(&self, file: FilePart, purpose: Option<&str>) -> Result<Payload> {
        self.client
            .execute(upload_request(endpoints::FILES_UPLOAD, file, purpose))
            .await
    }
}
