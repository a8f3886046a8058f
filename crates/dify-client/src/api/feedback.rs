//! Feedback API.

use serde_json::json;

use crate::client::DifyClient;
use crate::endpoints::{self, fill};
use crate::error::Result;
use crate::request::Request;
use crate::types::{Pagination, Payload};

use super::paginate;

/// Feedback API client.
pub struct FeedbackApi {
    client: DifyClient,
}

impl FeedbackApi {
    pub(crate) fn new(client: DifyClient) -> Self {
        Self { client }
    }

    /// Rate a message.
    pub async fn like(&self, message_id: &str, score: i32) -> Result<Payload> {
        let path = fill(endpoints::FEEDBACK_LIKE, &[("message_id", message_id)])?;
        self.client
            .execute(Request::post(path).json_value(json!({ "score": score })))
            .await
    }

    /// List feedback.
    pub async fn list(&self, pagination: Pagination) -> Result<Payload> {
        self.client
            .execute(paginate(Request::get(endpoints::FEEDBACKS), pagination))
            .await
    }
}
