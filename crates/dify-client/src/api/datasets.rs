//! Datasets (knowledge bases) API.

use crate::client::DifyClient;
use crate::credentials::Scope;
use crate::endpoints::{self, fill};
use crate::error::Result;
use crate::request::Request;
use crate::types::{
    CreateDatasetRequest, DatasetSearchRequest, ListDatasetsQuery, Payload, UpdateDatasetRequest,
};

/// Datasets API client. Authorized by the dataset key.
pub struct DatasetsApi {
    client: DifyClient,
}

impl DatasetsApi {
    pub(crate) fn new(client: DifyClient) -> Self {
        Self { client }
    }

    /// Create a dataset.
    pub async fn create(&self, request: &CreateDatasetRequest) -> Result<Payload> {
        self.client
            .execute(
                Request::post(endpoints::DATASETS)
                    .scope(Scope::Dataset)
                    .json(request)?,
            )
            .await
    }

    /// List datasets.
    pub async fn list(&self, query: &ListDatasetsQuery) -> Result<Payload> {
        let request = Request::get(endpoints::DATASETS)
            .scope(Scope::Dataset)
            .query("page", query.page)
            .query("limit", query.limit)
            .query("include_all", query.include_all)
            .query_opt("keyword", query.keyword.as_deref())
            .query_all("tag_ids", &query.tag_ids);
        self.client.execute(request).await
    }

    /// Get a dataset.
    pub async fn get(&self, dataset_id: &str) -> Result<Payload> {
        let path = fill(endpoints::DATASET, &[("dataset_id", dataset_id)])?;
        self.client
            .execute(Request::get(path).scope(Scope::Dataset))
            .await
    }

    /// Update a dataset's name or description.
    pub async fn update(&self, dataset_id: &str, request: &UpdateDatasetRequest) -> Result<Payload> {
        let path = fill(endpoints::DATASET, &[("dataset_id", dataset_id)])?;
        self.client
            .execute(Request::patch(path).scope(Scope::Dataset).json(request)?)
            .await
    }

    /// Delete a dataset.
    pub async fn delete(&self, dataset_id: &str) -> Result<Payload> {
        let path = fill(endpoints::DATASET, &[("dataset_id", dataset_id)])?;
        self.client
            .execute(Request::delete(path).scope(Scope::Dataset))
            .await
    }

    /// Run a retrieval test against a dataset.
    pub async fn search(&self, dataset_id: &str, request: &DatasetSearchRequest) -> Result<Payload> {
        let path = fill(endpoints::DATASET_SEARCH, &[("dataset_id", dataset_id)])?;
        self.client
            .execute(Request::post(path).scope(Scope::Dataset).json(request)?)
            .await
    }
}
