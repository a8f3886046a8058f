//! Files API.

use std::path::Path;

use crate::client::DifyClient;
use crate::endpoints::{self, fill};
use crate::error::Result;
use crate::request::{FilePart, Request};
use crate::types::Payload;

/// Files API client.
pub struct FilesApi {
    client: DifyClient,
}

/// Multipart upload of one file, with an optional `purpose` query parameter.
pub(super) fn upload_request(path: impl Into<String>, file: FilePart, purpose: Option<&str>) -> Request {
    Request::post(path).file(file).query_opt("purpose", purpose)
}

impl FilesApi {
    pub(crate) fn new(client: DifyClient) -> Self {
        Self { client }
    }

    /// Upload in-memory content.
    pub async fn upload_bytes(
        &self,
        file_name: &str,
        content: impl Into<Vec<u8>>,
        content_type: Option<&str>,
        purpose: Option<&str>,
    ) -> Result<Payload> {
        let mut file = FilePart::new(file_name, content);
        if let Some(content_type) = content_type {
            file = file.with_content_type(content_type);
        }
        self.client
            .execute(upload_request(endpoints::FILES_UPLOAD, file, purpose))
            .await
    }

    /// Upload a local file.
    pub async fn upload_path(&self, path: impl AsRef<Path>, purpose: Option<&str>) -> Result<Payload> {
        let file = FilePart::from_path(path).await?;
        self.client
            .execute(upload_request(endpoints::FILES_UPLOAD, file, purpose))
            .await
    }

    /// Preview an uploaded file.
    pub async fn preview(&self, file_id: &str) -> Result<Payload> {
        let path = fill(endpoints::FILE_PREVIEW, &[("file_id", file_id)])?;
        self.client.execute(Request::get(path)).await
    }
}
