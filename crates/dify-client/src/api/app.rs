//! App configuration API.

use crate::client::DifyClient;
use crate::credentials::Scope;
use crate::endpoints;
use crate::error::Result;
use crate::request::Request;
use crate::types::Payload;

/// App settings and metadata. Authorized by the app key.
pub struct AppApi {
    client: DifyClient,
}

impl AppApi {
    pub(crate) fn new(client: DifyClient) -> Self {
        Self { client }
    }

    async fn get(&self, path: &str) -> Result<Payload> {
        self.client
            .execute(Request::get(path).scope(Scope::App))
            .await
    }

    /// Name, description and tags of the app.
    pub async fn basic_info(&self) -> Result<Payload> {
        self.get(endpoints::APP_BASIC_INFO).await
    }

    /// Input form and feature parameters.
    pub async fn parameters(&self) -> Result<Payload> {
        self.get(endpoints::APP_PARAMETERS).await
    }

    /// Tool icons and other metadata.
    pub async fn meta(&self) -> Result<Payload> {
        self.get(endpoints::APP_META).await
    }

    /// WebApp settings.
    pub async fn webapp_settings(&self) -> Result<Payload> {
        self.get(endpoints::APP_WEBAPP_SETTINGS).await
    }

    /// Basic info of a workflow app.
    pub async fn workflow_basic_info(&self) -> Result<Payload> {
        self.get(endpoints::WORKFLOW_APP_BASIC_INFO).await
    }

    /// Parameters of a workflow app.
    pub async fn workflow_parameters(&self) -> Result<Payload> {
        self.get(endpoints::WORKFLOW_APP_PARAMETERS).await
    }

    /// WebApp settings of a workflow app.
    pub async fn workflow_webapp_settings(&self) -> Result<Payload> {
        self.get(endpoints::WORKFLOW_APP_WEBAPP_SETTINGS).await
    }
}
