//! Models API.

use crate::client::DifyClient;
use crate::endpoints;
use crate::error::Result;
use crate::request::Request;
use crate::types::Payload;

/// Models API client.
pub struct ModelsApi {
    client: DifyClient,
}

impl ModelsApi {
    pub(crate) fn new(client: DifyClient) -> Self {
        Self { client }
    }

    /// List the available embedding models.
    pub async fn list_embedding_models(&self) -> Result<Payload> {
        self.client
            .execute(Request::get(endpoints::EMBEDDING_MODELS))
            .await
    }
}
