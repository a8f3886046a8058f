//! Document segments API.

use crate::client::DifyClient;
use crate::credentials::Scope;
use crate::endpoints::{self, fill};
use crate::error::Result;
use crate::request::Request;
use crate::types::{Pagination, Payload, SegmentContent, SegmentUpdate};

use super::paginate;

/// Segments (chunks) API client. Authorized by the dataset key.
pub struct SegmentsApi {
    client: DifyClient,
}

impl SegmentsApi {
    pub(crate) fn new(client: DifyClient) -> Self {
        Self { client }
    }

    /// List the segments of a document.
    pub async fn list(
        &self,
        dataset_id: &str,
        document_id: &str,
        pagination: Pagination,
    ) -> Result<Payload> {
        let path = fill(
            endpoints::SEGMENTS,
            &[("dataset_id", dataset_id), ("document_id", document_id)],
        )?;
        self.client
            .execute(paginate(Request::get(path).scope(Scope::Dataset), pagination))
            .await
    }

    /// Add a segment to a document.
    pub async fn add(
        &self,
        dataset_id: &str,
        document_id: &str,
        segment: &SegmentContent,
    ) -> Result<Payload> {
        let path = fill(
            endpoints::SEGMENTS,
            &[("dataset_id", dataset_id), ("document_id", document_id)],
        )?;
        self.client
            .execute(Request::post(path).scope(Scope::Dataset).json(segment)?)
            .await
    }

    /// Get a segment.
    pub async fn get(&self, dataset_id: &str, document_id: &str, segment_id: &str) -> Result<Payload> {
        let path = segment_path(endpoints::SEGMENT, dataset_id, document_id, segment_id)?;
        self.client
            .execute(Request::get(path).scope(Scope::Dataset))
            .await
    }

    /// Update a segment.
    pub async fn update(
        &self,
        dataset_id: &str,
        document_id: &str,
        segment_id: &str,
        update: &SegmentUpdate,
    ) -> Result<Payload> {
        let path = segment_path(endpoints::SEGMENT, dataset_id, document_id, segment_id)?;
        self.client
            .execute(Request::post(path).scope(Scope::Dataset).json(update)?)
            .await
    }

    /// Delete a segment.
    pub async fn delete(&self, dataset_id: &str, document_id: &str, segment_id: &str) -> Result<Payload> {
        let path = segment_path(endpoints::SEGMENT, dataset_id, document_id, segment_id)?;
        self.client
            .execute(Request::delete(path).scope(Scope::Dataset))
            .await
    }

    /// List the child chunks of a segment.
    pub async fn list_children(
        &self,
        dataset_id: &str,
        document_id: &str,
        segment_id: &str,
    ) -> Result<Payload> {
        let path = segment_path(endpoints::SEGMENT_CHILDREN, dataset_id, document_id, segment_id)?;
        self.client
            .execute(Request::get(path).scope(Scope::Dataset))
            .await
    }

    /// Create a child chunk.
    pub async fn create_child(
        &self,
        dataset_id: &str,
        document_id: &str,
        segment_id: &str,
        child: &SegmentContent,
    ) -> Result<Payload> {
        let path = segment_path(endpoints::SEGMENT_CHILDREN, dataset_id, document_id, segment_id)?;
        self.client
            .execute(Request::post(path).scope(Scope::Dataset).json(child)?)
            .await
    }

    /// Update a child chunk.
    pub async fn update_child(
        &self,
        dataset_id: &str,
        document_id: &str,
        segment_id: &str,
        child_id: &str,
        update: &SegmentUpdate,
    ) -> Result<Payload> {
        let path = child_path(dataset_id, document_id, segment_id, child_id)?;
        self.client
            .execute(Request::post(path).scope(Scope::Dataset).json(update)?)
            .await
    }

    /// Delete a child chunk.
    pub async fn delete_child(
        &self,
        dataset_id: &str,
        document_id: &str,
        segment_id: &str,
        child_id: &str,
    ) -> Result<Payload> {
        let path = child_path(dataset_id, document_id, segment_id, child_id)?;
        self.client
            .execute(Request::delete(path).scope(Scope::Dataset))
            .await
    }
}

fn segment_path(
    template: &str,
    dataset_id: &str,
    document_id: &str,
    segment_id: &str,
) -> Result<String> {
    fill(
        template,
        &[
            ("dataset_id", dataset_id),
            ("document_id", document_id),
            ("segment_id", segment_id),
        ],
    )
}

fn child_path(dataset_id: &str, document_id: &str, segment_id: &str, child_id: &str) -> Result<String> {
    fill(
        endpoints::SEGMENT_CHILD,
        &[
            ("dataset_id", dataset_id),
            ("document_id", document_id),
            ("segment_id", segment_id),
            ("child_id", child_id),
        ],
    )
}
