//! Knowledge-base tags API.

use serde_json::json;

use crate::client::DifyClient;
use crate::credentials::Scope;
use crate::endpoints::{self, fill};
use crate::error::Result;
use crate::request::Request;
use crate::types::Payload;

/// Knowledge-base tag API client. Authorized by the dataset key.
pub struct TagsApi {
    client: DifyClient,
}

impl TagsApi {
    pub(crate) fn new(client: DifyClient) -> Self {
        Self { client }
    }

    /// List knowledge-base tags.
    pub async fn list(&self) -> Result<Payload> {
        self.client
            .execute(Request::get(endpoints::KB_TAGS).scope(Scope::Dataset))
            .await
    }

    /// Create a tag.
    pub async fn create(&self, name: &str) -> Result<Payload> {
        self.client
            .execute(
                Request::post(endpoints::KB_TAGS)
                    .scope(Scope::Dataset)
                    .json_value(json!({ "name": name })),
            )
            .await
    }

    /// Delete a tag.
    pub async fn delete(&self, tag_id: &str) -> Result<Payload> {
        let path = fill(endpoints::KB_TAG, &[("tag_id", tag_id)])?;
        self.client
            .execute(Request::delete(path).scope(Scope::Dataset))
            .await
    }

    /// Rename a tag.
    pub async fn rename(&self, tag_id: &str, name: &str) -> Result<Payload> {
        let path = fill(endpoints::KB_TAG_NAME, &[("tag_id", tag_id)])?;
        self.client
            .execute(
                Request::post(path)
                    .scope(Scope::Dataset)
                    .json_value(json!({ "name": name })),
            )
            .await
    }

    /// Attach a tag to a dataset.
    pub async fn bind_dataset(&self, tag_id: &str, dataset_id: &str) -> Result<Payload> {
        let path = fill(
            endpoints::KB_TAG_DATASET,
            &[("tag_id", tag_id), ("dataset_id", dataset_id)],
        )?;
        self.client
            .execute(Request::post(path).scope(Scope::Dataset))
            .await
    }

    /// Detach a tag from a dataset.
    pub async fn unbind_dataset(&self, tag_id: &str, dataset_id: &str) -> Result<Payload> {
        let path = fill(
            endpoints::KB_TAG_DATASET,
            &[("tag_id", tag_id), ("dataset_id", dataset_id)],
        )?;
        self.client
            .execute(Request::delete(path).scope(Scope::Dataset))
            .await
    }

    /// Tags bound to a dataset.
    pub async fn dataset_tags(&self, dataset_id: &str) -> Result<Payload> {
        let path = fill(endpoints::DATASET_TAGS, &[("dataset_id", dataset_id)])?;
        self.client
            .execute(Request::get(path).scope(Scope::Dataset))
            .await
    }
}
