//! Documents API.

use serde_json::{json, Value};

use crate::client::DifyClient;
use crate::credentials::Scope;
use crate::endpoints::{self, fill};
use crate::error::Result;
use crate::request::{FilePart, Request};
use crate::types::{DocumentTextRequest, Pagination, Payload};

use super::paginate;

/// Documents API client. Authorized by the dataset key.
pub struct DocumentsApi {
    client: DifyClient,
}

impl DocumentsApi {
    pub(crate) fn new(client: DifyClient) -> Self {
        Self { client }
    }

    /// Create a document from text.
    pub async fn create_from_text(
        &self,
        dataset_id: &str,
        request: &DocumentTextRequest,
    ) -> Result<Payload> {
        let path = fill(endpoints::DOCUMENT_CREATE_BY_TEXT, &[("dataset_id", dataset_id)])?;
        self.client
            .execute(Request::post(path).scope(Scope::Dataset).json(request)?)
            .await
    }

    /// Create a document from an uploaded file.
    ///
    /// `settings` (indexing technique, process rule, ...) is sent as the
    /// JSON-encoded `data` form field.
    pub async fn create_from_file(
        &self,
        dataset_id: &str,
        file: FilePart,
        settings: Option<&Value>,
    ) -> Result<Payload> {
        let path = fill(endpoints::DOCUMENT_CREATE_BY_FILE, &[("dataset_id", dataset_id)])?;
        self.client
            .execute(file_request(path, file, settings)?)
            .await
    }

    /// Replace a document's content with text.
    pub async fn update_text(
        &self,
        dataset_id: &str,
        document_id: &str,
        request: &DocumentTextRequest,
    ) -> Result<Payload> {
        let path = fill(
            endpoints::DOCUMENT_UPDATE_BY_TEXT,
            &[("dataset_id", dataset_id), ("document_id", document_id)],
        )?;
        self.client
            .execute(Request::post(path).scope(Scope::Dataset).json(request)?)
            .await
    }

    /// Replace a document's content with a file.
    pub async fn update_file(
        &self,
        dataset_id: &str,
        document_id: &str,
        file: FilePart,
        settings: Option<&Value>,
    ) -> Result<Payload> {
        let path = fill(
            endpoints::DOCUMENT_UPDATE_BY_FILE,
            &[("dataset_id", dataset_id), ("document_id", document_id)],
        )?;
        self.client
            .execute(file_request(path, file, settings)?)
            .await
    }

    /// Embedding progress of a document upload batch.
    pub async fn indexing_status(&self, dataset_id: &str, batch_id: &str) -> Result<Payload> {
        let path = fill(
            endpoints::DOCUMENT_INDEXING_STATUS,
            &[("dataset_id", dataset_id), ("batch_id", batch_id)],
        )?;
        self.client
            .execute(Request::get(path).scope(Scope::Dataset))
            .await
    }

    /// Get a document.
    pub async fn get(&self, dataset_id: &str, document_id: &str) -> Result<Payload> {
        let path = document_path(dataset_id, document_id)?;
        self.client
            .execute(Request::get(path).scope(Scope::Dataset))
            .await
    }

    /// Delete a document.
    pub async fn delete(&self, dataset_id: &str, document_id: &str) -> Result<Payload> {
        let path = document_path(dataset_id, document_id)?;
        self.client
            .execute(Request::delete(path).scope(Scope::Dataset))
            .await
    }

    /// List the documents of a dataset.
    pub async fn list(&self, dataset_id: &str, pagination: Pagination) -> Result<Payload> {
        let path = fill(endpoints::DOCUMENTS, &[("dataset_id", dataset_id)])?;
        self.client
            .execute(paginate(Request::get(path).scope(Scope::Dataset), pagination))
            .await
    }

    /// Enable, disable or archive a document.
    pub async fn update_status(
        &self,
        dataset_id: &str,
        document_id: &str,
        status: &str,
    ) -> Result<Payload> {
        let path = fill(
            endpoints::DOCUMENT_STATUS,
            &[("dataset_id", dataset_id), ("document_id", document_id)],
        )?;
        self.client
            .execute(
                Request::post(path)
                    .scope(Scope::Dataset)
                    .json_value(json!({ "status": status })),
            )
            .await
    }
}

fn document_path(dataset_id: &str, document_id: &str) -> Result<String> {
    fill(
        endpoints::DOCUMENT,
        &[("dataset_id", dataset_id), ("document_id", document_id)],
    )
}

fn file_request(path: String, file: FilePart, settings: Option<&Value>) -> Result<Request> {
    let mut request = Request::post(path).scope(Scope::Dataset).file(file);
    if let Some(settings) = settings {
        request = request.field("data", serde_json::to_string(settings)?);
    }
    Ok(request)
}
