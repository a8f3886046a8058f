//! Request and response types for the Dify API.
//!
//! Responses are not modelled per endpoint: a successful call yields a
//! [`Payload`], which callers can deserialize into their own types.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Payload
// ─────────────────────────────────────────────────────────────────────────────

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body parsed as JSON.
    Json(Value),
    /// Body that was not valid JSON, exactly as received.
    Text(String),
}

impl Payload {
    /// Decode a body: JSON if it parses, otherwise the raw text.
    pub fn from_body(body: String) -> Self {
        match serde_json::from_str(&body) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(body),
        }
    }

    /// The JSON value, if the body was JSON.
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            Payload::Text(_) => None,
        }
    }

    /// The raw text, if the body was not JSON.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Json(_) => None,
            Payload::Text(text) => Some(text),
        }
    }

    /// Convert into a JSON value; text bodies become JSON strings.
    pub fn into_json(self) -> Value {
        match self {
            Payload::Json(value) => value,
            Payload::Text(text) => Value::String(text),
        }
    }

    /// Deserialize the body into a typed response.
    pub fn deserialize<T: DeserializeOwned>(self) -> crate::Result<T> {
        match self {
            Payload::Json(value) => Ok(serde_json::from_value(value)?),
            Payload::Text(text) => Ok(serde_json::from_str(&text)?),
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Json(value) => write!(f, "{value}"),
            Payload::Text(text) => f.write_str(text),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Streaming
// ─────────────────────────────────────────────────────────────────────────────

/// One server-sent event.
///
/// The client does not interpret event types; `data` is passed through as
/// received (usually a JSON document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamedEvent {
    /// Event type label (`message` when the server sent none).
    pub event: String,
    /// Event data, multi-line data joined with `\n`.
    pub data: String,
    /// Resumption id, if the server set one.
    pub id: Option<String>,
    /// Reconnection interval suggested by the server.
    pub retry: Option<Duration>,
}

impl StreamedEvent {
    /// Parse the data field as JSON.
    pub fn json(&self) -> crate::Result<Value> {
        Ok(serde_json::from_str(&self.data)?)
    }
}

impl From<eventsource_stream::Event> for StreamedEvent {
    fn from(event: eventsource_stream::Event) -> Self {
        Self {
            event: event.event,
            data: event.data,
            id: (!event.id.is_empty()).then_some(event.id),
            retry: event.retry,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared
// ─────────────────────────────────────────────────────────────────────────────

/// Page selection for list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Page number (1-based).
    pub page: Option<u32>,
    /// Items per page.
    pub limit: Option<u32>,
}

impl Pagination {
    /// Select a page and page size.
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: Some(page),
            limit: Some(limit),
        }
    }
}

/// How the server should deliver a generated response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// Single JSON response once generation completes.
    #[default]
    Blocking,
    /// Server-sent events as generation progresses.
    Streaming,
}

// ─────────────────────────────────────────────────────────────────────────────
// Chat & Completion
// ─────────────────────────────────────────────────────────────────────────────

/// Request to send a chat message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatMessageRequest {
    /// User message.
    pub query: String,
    /// App variable values.
    #[serde(default)]
    pub inputs: HashMap<String, Value>,
    /// Delivery mode; set by the chat façade.
    #[serde(default)]
    pub response_mode: ResponseMode,
    /// End-user identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Continue an existing conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Previously uploaded files to attach.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<Value>,
}

impl ChatMessageRequest {
    /// Create a request with just the user message.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set the end-user identifier.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Continue an existing conversation.
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Set an app input variable.
    pub fn with_input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inputs.insert(name.into(), value.into());
        self
    }
}

/// Request for a one-shot text generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Generation inputs (prompt variables).
    pub inputs: HashMap<String, Value>,
    /// Delivery mode; set by the completion façade.
    #[serde(default)]
    pub response_mode: ResponseMode,
    /// End-user identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Datasets
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a dataset (knowledge base).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateDatasetRequest {
    /// Dataset name.
    pub name: String,
    /// Dataset description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Visibility (`only_me`, `all_team_members`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission: Option<String>,
    /// `high_quality` or `economy`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexing_technique: Option<String>,
}

/// Request to update dataset fields. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateDatasetRequest {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Filters for listing datasets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDatasetsQuery {
    /// Match dataset names containing this keyword.
    pub keyword: Option<String>,
    /// Datasets must carry all of these tags.
    pub tag_ids: Vec<String>,
    /// Page number.
    pub page: u32,
    /// Items per page (1-100).
    pub limit: u32,
    /// Include every dataset in the workspace (owner only).
    pub include_all: bool,
}

impl Default for ListDatasetsQuery {
    fn default() -> Self {
        Self {
            keyword: None,
            tag_ids: Vec::new(),
            page: 1,
            limit: 20,
            include_all: false,
        }
    }
}

/// Retrieval test against a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSearchRequest {
    /// Query wrapper; the API expects `{"content": "..."}`.
    pub query: SearchQuery,
    /// Number of results.
    pub top_k: u32,
    /// Drop results scoring below this value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,
}

/// Search text wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Search text.
    pub content: String,
}

impl DatasetSearchRequest {
    /// Search for `content`, returning the top 5 results.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            query: SearchQuery {
                content: content.into(),
            },
            top_k: 5,
            score_threshold: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Documents & Segments
// ─────────────────────────────────────────────────────────────────────────────

/// Document body supplied as text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentTextRequest {
    /// Document text.
    pub text: String,
    /// Document title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Arbitrary document metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Segment content for create calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentContent {
    /// Segment text.
    pub content: String,
    /// Segment metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Segment changes for update calls. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentUpdate {
    /// New segment text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New segment metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Workflows
// ─────────────────────────────────────────────────────────────────────────────

/// Request to execute a workflow.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowRunRequest {
    /// Workflow input variables.
    pub inputs: HashMap<String, Value>,
    /// End-user identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_from_json_body() {
        let payload = Payload::from_body(r#"{"answer": "hi", "n": [1, 2]}"#.to_string());
        assert_eq!(payload, Payload::Json(json!({"answer": "hi", "n": [1, 2]})));
    }

    #[test]
    fn test_payload_from_text_body() {
        let payload = Payload::from_body("plain <b>text</b>".to_string());
        assert_eq!(payload.as_text(), Some("plain <b>text</b>"));
        assert_eq!(payload.to_string(), "plain <b>text</b>");
    }

    #[test]
    fn test_payload_empty_body_is_text() {
        assert_eq!(Payload::from_body(String::new()), Payload::Text(String::new()));
    }

    #[test]
    fn test_payload_deserialize() {
        #[derive(Deserialize)]
        struct Answer {
            answer: String,
        }
        let payload = Payload::Json(json!({"answer": "42"}));
        let answer: Answer = payload.deserialize().unwrap();
        assert_eq!(answer.answer, "42");
    }

    #[test]
    fn test_streamed_event_from_eventsource() {
        let event = StreamedEvent::from(eventsource_stream::Event {
            event: "message".to_string(),
            data: r#"{"answer": "Hel"}"#.to_string(),
            id: String::new(),
            retry: None,
        });
        assert_eq!(event.event, "message");
        assert_eq!(event.id, None);
        assert_eq!(event.json().unwrap(), json!({"answer": "Hel"}));
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatMessageRequest::new("Hello")
            .with_user("user-1")
            .with_input("lang", "en");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "query": "Hello",
                "inputs": {"lang": "en"},
                "response_mode": "blocking",
                "user": "user-1"
            })
        );
    }

    #[test]
    fn test_search_request_wraps_query() {
        let request = DatasetSearchRequest::new("refund policy");
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, json!({"query": {"content": "refund policy"}, "top_k": 5}));
    }

    #[test]
    fn test_list_datasets_defaults() {
        let query = ListDatasetsQuery::default();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 20);
        assert!(!query.include_all);
    }
}
