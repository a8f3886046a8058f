//! Remote route templates.
//!
//! Placeholders are written `{name}` and substituted with [`fill`] before a
//! path reaches the executor.

use crate::error::{Error, Result};

// Chat
pub const CHAT_MESSAGES: &str = "/v1/chat-messages";
pub const CHAT_MESSAGE: &str = "/v1/chat-messages/{conversation_id}";
pub const CHAT_MESSAGE_STOP: &str = "/v1/chat-messages/{task_id}/stop";
pub const CHAT_SUGGESTED_QUESTIONS: &str = "/v1/chat-messages/{message_id}/suggested-questions";

// Completion
pub const COMPLETION_MESSAGES: &str = "/v1/completion-messages";
pub const COMPLETION_MESSAGES_STREAM: &str = "/v1/completion-messages/stream";
pub const COMPLETION_MESSAGE_STOP: &str = "/v1/completion-messages/{message_id}/stop";

// Datasets
pub const DATASETS: &str = "/v1/datasets";
pub const DATASET: &str = "/v1/datasets/{dataset_id}";
pub const DATASET_SEARCH: &str = "/v1/datasets/{dataset_id}/search";
pub const DATASET_TAGS: &str = "/v1/datasets/{dataset_id}/tags";

// Documents
pub const DOCUMENT_CREATE_BY_TEXT: &str = "/v1/datasets/{dataset_id}/document/create-by-text";
pub const DOCUMENT_CREATE_BY_FILE: &str = "/v1/datasets/{dataset_id}/document/create-by-file";
pub const DOCUMENT_UPDATE_BY_TEXT: &str =
    "/v1/datasets/{dataset_id}/documents/{document_id}/update-by-text";
pub const DOCUMENT_UPDATE_BY_FILE: &str =
    "/v1/datasets/{dataset_id}/documents/{document_id}/update-by-file";
pub const DOCUMENT_INDEXING_STATUS: &str =
    "/v1/datasets/{dataset_id}/documents/{batch_id}/indexing-status";
pub const DOCUMENTS: &str = "/v1/datasets/{dataset_id}/documents";
pub const DOCUMENT: &str = "/v1/datasets/{dataset_id}/documents/{document_id}";
pub const DOCUMENT_STATUS: &str = "/v1/datasets/{dataset_id}/documents/{document_id}/status";

// Segments
pub const SEGMENTS: &str = "/v1/datasets/{dataset_id}/documents/{document_id}/segments";
pub const SEGMENT: &str =
    "/v1/datasets/{dataset_id}/documents/{document_id}/segments/{segment_id}";
pub const SEGMENT_CHILDREN: &str =
    "/v1/datasets/{dataset_id}/documents/{document_id}/segments/{segment_id}/children";
pub const SEGMENT_CHILD: &str =
    "/v1/datasets/{dataset_id}/documents/{document_id}/segments/{segment_id}/children/{child_id}";

// Files
pub const FILES_UPLOAD: &str = "/v1/files/upload";
pub const FILE_PREVIEW: &str = "/v1/files/{file_id}/preview";

// Conversations
pub const CONVERSATIONS: &str = "/v1/conversations";
pub const CONVERSATION: &str = "/v1/conversations/{conversation_id}";
pub const CONVERSATION_NAME: &str = "/v1/conversations/{conversation_id}/name";
pub const CONVERSATION_MESSAGES: &str = "/v1/conversations/{conversation_id}/messages";
pub const CONVERSATION_VARIABLES: &str = "/v1/conversations/{conversation_id}/variables";

// Feedback
pub const FEEDBACK_LIKE: &str = "/v1/feedbacks/{message_id}/like";
pub const FEEDBACKS: &str = "/v1/feedbacks";

// Workflows
pub const WORKFLOW_EXECUTE: &str = "/v1/workflows/{workflow_id}/execute";
pub const WORKFLOW_EXECUTION: &str = "/v1/workflows/{workflow_id}/executions/{execution_id}";
pub const WORKFLOW_EXECUTION_STOP: &str =
    "/v1/workflows/{workflow_id}/executions/{execution_id}/stop";
pub const WORKFLOW_EXECUTION_LOGS: &str =
    "/v1/workflows/{workflow_id}/executions/{execution_id}/logs";
pub const WORKFLOW_FILES_UPLOAD: &str = "/v1/workflows/{workflow_id}/files/upload";

// App configuration
pub const APP_BASIC_INFO: &str = "/v1/app/basic-info";
pub const APP_PARAMETERS: &str = "/v1/app/parameters";
pub const APP_META: &str = "/v1/app/meta";
pub const APP_WEBAPP_SETTINGS: &str = "/v1/app/webapp-settings";
pub const WORKFLOW_APP_BASIC_INFO: &str = "/v1/workflow/app/basic-info";
pub const WORKFLOW_APP_PARAMETERS: &str = "/v1/workflow/app/parameters";
pub const WORKFLOW_APP_WEBAPP_SETTINGS: &str = "/v1/workflow/app/webapp-settings";

// Models
pub const EMBEDDING_MODELS: &str = "/v1/models/embeddings";

// Knowledge-base tags
pub const KB_TAGS: &str = "/v1/metadata/kb-type-tags";
pub const KB_TAG: &str = "/v1/metadata/kb-type-tags/{tag_id}";
pub const KB_TAG_NAME: &str = "/v1/metadata/kb-type-tags/{tag_id}/name";
pub const KB_TAG_DATASET: &str = "/v1/metadata/kb-type-tags/{tag_id}/datasets/{dataset_id}";

/// Substitute `{name}` placeholders in `template`.
///
/// Values are inserted verbatim. Fails if any placeholder is left unresolved.
pub fn fill(template: &str, params: &[(&str, &str)]) -> Result<String> {
    let mut path = template.to_string();
    for (name, value) in params {
        path = path.replace(&format!("{{{name}}}"), value);
    }
    ensure_resolved(&path)?;
    Ok(path)
}

/// Fail if `path` still contains a `{placeholder}`.
pub(crate) fn ensure_resolved(path: &str) -> Result<()> {
    if let Some(start) = path.find('{') {
        let end = path[start..]
            .find('}')
            .map_or(path.len(), |offset| start + offset + 1);
        return Err(Error::Config(format!(
            "unresolved placeholder '{}' in path '{path}'",
            &path[start..end]
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_substitutes_all_placeholders() {
        let path = fill(SEGMENT_CHILD, &[
            ("dataset_id", "ds"),
            ("document_id", "doc"),
            ("segment_id", "seg"),
            ("child_id", "c1"),
        ])
        .unwrap();
        assert_eq!(path, "/v1/datasets/ds/documents/doc/segments/seg/children/c1");
    }

    #[test]
    fn test_fill_without_placeholders() {
        assert_eq!(fill(DATASETS, &[]).unwrap(), "/v1/datasets");
    }

    #[test]
    fn test_unresolved_placeholder_is_config_error() {
        let err = fill(DOCUMENT, &[("dataset_id", "ds")]).unwrap_err();
        match err {
            Error::Config(msg) => assert!(msg.contains("{document_id}")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_parameter_is_ignored() {
        let path = fill(DATASET, &[("dataset_id", "ds"), ("extra", "x")]).unwrap();
        assert_eq!(path, "/v1/datasets/ds");
    }
}
