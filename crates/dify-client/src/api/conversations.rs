//! Conversations API.

use serde_json::json;

use crate::client::DifyClient;
use crate::endpoints::{self, fill};
use crate::error::Result;
use crate::request::Request;
use crate::types::{Pagination, Payload};

use super::paginate;

/// Conversations API client.
pub struct ConversationsApi {
    client: DifyClient,
}

impl ConversationsApi {
    pub(crate) fn new(client: DifyClient) -> Self {
        Self { client }
    }

    /// List conversations.
    pub async fn list(&self, pagination: Pagination) -> Result<Payload> {
        self.client
            .execute(paginate(Request::get(endpoints::CONVERSATIONS), pagination))
            .await
    }

    /// Get the message history of a conversation.
    pub async fn history(&self, conversation_id: &str, pagination: Pagination) -> Result<Payload> {
        let path = fill(
            endpoints::CONVERSATION_MESSAGES,
            &[("conversation_id", conversation_id)],
        )?;
        self.client
            .execute(paginate(Request::get(path), pagination))
            .await
    }

    /// Delete a conversation.
    pub async fn delete(&self, conversation_id: &str) -> Result<Payload> {
        let path = fill(endpoints::CONVERSATION, &[("conversation_id", conversation_id)])?;
        self.client.execute(Request::delete(path)).await
    }

    /// Rename a conversation.
    pub async fn rename(&self, conversation_id: &str, name: &str) -> Result<Payload> {
        let path = fill(endpoints::CONVERSATION_NAME, &[("conversation_id", conversation_id)])?;
        self.client
            .execute(Request::post(path).json_value(json!({ "name": name })))
            .await
    }

    /// Get the variables of a conversation.
    pub async fn variables(&self, conversation_id: &str) -> Result<Payload> {
        let path = fill(
            endpoints::CONVERSATION_VARIABLES,
            &[("conversation_id", conversation_id)],
        )?;
        self.client.execute(Request::get(path)).await
    }
}
