//! Resource façades.
//!
//! Each façade binds a credential scope, fills a route template and hands
//! the request to the executor. Errors pass through unchanged.

mod app;
mod chat;
mod completion;
mod conversations;
mod datasets;
mod documents;
mod feedback;
mod files;
mod models;
mod segments;
mod tags;
mod workflows;

pub use app::AppApi;
pub use chat::ChatApi;
pub use completion::CompletionApi;
pub use conversations::ConversationsApi;
pub use datasets::DatasetsApi;
pub use documents::DocumentsApi;
pub use feedback::FeedbackApi;
pub use files::FilesApi;
pub use models::ModelsApi;
pub use segments::SegmentsApi;
pub use tags::TagsApi;
pub use workflows::WorkflowsApi;

use crate::request::Request;
use crate::types::Pagination;

/// Add `page`/`limit` query parameters when set.
fn paginate(request: Request, pagination: Pagination) -> Request {
    request
        .query_opt("page", pagination.page)
        .query_opt("limit", pagination.limit)
}
