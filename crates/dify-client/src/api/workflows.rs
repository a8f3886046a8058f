//! Workflows API.

use std::path::Path;

use crate::client::DifyClient;
use crate::credentials::Scope;
use crate::endpoints::{self, fill};
use crate::error::Result;
use crate::request::{FilePart, Request};
use crate::types::{Payload, WorkflowRunRequest};

/// Workflows API client. Authorized by the workflow key.
pub struct WorkflowsApi {
    client: DifyClient,
}

impl WorkflowsApi {
    pub(crate) fn new(client: DifyClient) -> Self {
        Self { client }
    }

    /// Run a workflow.
    pub async fn execute(&self, workflow_id: &str, request: &WorkflowRunRequest) -> Result<Payload> {
        let path = fill(endpoints::WORKFLOW_EXECUTE, &[("workflow_id", workflow_id)])?;
        self.client
            .execute(Request::post(path).scope(Scope::Workflow).json(request)?)
            .await
    }

    /// Status of a workflow execution.
    pub async fn execution_status(&self, workflow_id: &str, execution_id: &str) -> Result<Payload> {
        let path = execution_path(endpoints::WORKFLOW_EXECUTION, workflow_id, execution_id)?;
        self.client
            .execute(Request::get(path).scope(Scope::Workflow))
            .await
    }

    /// Stop a running execution.
    pub async fn stop(&self, workflow_id: &str, execution_id: &str) -> Result<Payload> {
        let path = execution_path(endpoints::WORKFLOW_EXECUTION_STOP, workflow_id, execution_id)?;
        self.client
            .execute(Request::post(path).scope(Scope::Workflow))
            .await
    }

    /// Logs of an execution.
    pub async fn logs(&self, workflow_id: &str, execution_id: &str) -> Result<Payload> {
        let path = execution_path(endpoints::WORKFLOW_EXECUTION_LOGS, workflow_id, execution_id)?;
        self.client
            .execute(Request::get(path).scope(Scope::Workflow))
            .await
    }

    /// Upload a local file for use as a workflow input.
    pub async fn upload_file(&self, workflow_id: &str, path: impl AsRef<Path>) -> Result<Payload> {
        let file = FilePart::from_path(path).await?;
        let route = fill(endpoints::WORKFLOW_FILES_UPLOAD, &[("workflow_id", workflow_id)])?;
        self.client
            .execute(Request::post(route).scope(Scope::Workflow).file(file))
            .await
    }
}

fn execution_path(template: &str, workflow_id: &str, execution_id: &str) -> Result<String> {
    fill(
        template,
        &[("workflow_id", workflow_id), ("execution_id", execution_id)],
    )
}
