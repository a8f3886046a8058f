//! HTTP client SDK for the Dify conversational AI and knowledge-base API.
//!
//! Every call goes through one executor that resolves the credential for
//! the call's [`Scope`], retries transport failures with exponential backoff
//! and classifies HTTP failures into [`Error`].
//!
//! # Example
//!
//! ```no_run
//! use dify_client::{ChatMessageRequest, Credentials, DifyClient, Result, Scope};
//!
//! # async fn example() -> Result<()> {
//! // One key per scope; `Default` is required.
//! let credentials = Credentials::from_scopes([
//!     (Scope::Default, "app-..."),
//!     (Scope::Dataset, "dataset-..."),
//! ])?;
//!
//! let client = DifyClient::builder()
//!     .base_url("https://api.dify.ai")
//!     .credentials(credentials)
//!     .build()?;
//!
//! // Blocking answer
//! let answer = client
//!     .chat()
//!     .send(ChatMessageRequest::new("Hello!").with_user("user-1"))
//!     .await?;
//! println!("{answer}");
//!
//! // Streamed answer
//! use futures::StreamExt;
//! let mut events = client
//!     .chat()
//!     .stream(ChatMessageRequest::new("Tell me a story").with_user("user-1"))
//!     .await?;
//! while let Some(event) = events.next().await {
//!     let event = event?;
//!     println!("{}: {}", event.event, event.data);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Chat / Completion**: send, stream and stop generations
//! - **Conversations / Feedback**: history, rename, ratings
//! - **Files**: upload and preview
//! - **Datasets / Documents / Segments / Tags**: knowledge-base management
//! - **Workflows**: run, inspect and stop executions
//! - **App**: app settings and parameters
//!
//! Anything not covered by a façade can be sent with [`DifyClient::execute`]
//! or [`DifyClient::stream`] and a hand-built [`Request`].

pub mod api;
pub mod blocking;
pub mod client;
pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod request;
pub mod retry;
pub mod stream;
pub mod types;

pub use blocking::{BlockingClient, BlockingEventStream};
pub use client::{ClientBuilder, DifyClient};
pub use credentials::{Credentials, Scope};
pub use error::{ApiError, Error, Result};
pub use request::{Body, FilePart, Request};
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};
pub use stream::EventStream;
pub use types::*;

pub use dify_config::DifyConfig;
