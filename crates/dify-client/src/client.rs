//! Main client implementation and request executor.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::HeaderMap;
use reqwest::Method;
use tokio::sync::OnceCell;
use url::Url;

use dify_config::DifyConfig;

use crate::api::{
    AppApi, ChatApi, CompletionApi, ConversationsApi, DatasetsApi, DocumentsApi, FeedbackApi,
    FilesApi, ModelsApi, SegmentsApi, TagsApi, WorkflowsApi,
};
use crate::blocking::BlockingClient;
use crate::credentials::{Credentials, Scope};
use crate::endpoints;
use crate::error::{Error, Result};
use crate::request::{self, Body, Request, REQUEST_ID_HEADER};
use crate::retry::{self, RetryPolicy, Sleeper, TokioSleeper};
use crate::types::Payload;

/// Default per-attempt timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Dify API client.
///
/// Cheap to clone; clones share one connection pool, which is created on
/// first use.
///
/// # Example
///
/// ```no_run
/// use dify_client::{ChatMessageRequest, DifyClient};
///
/// # async fn example() -> dify_client::Result<()> {
/// let client = DifyClient::builder()
///     .base_url("https://api.dify.ai")
///     .api_key("app-...")
///     .build()?;
///
/// let answer = client
///     .chat()
///     .send(ChatMessageRequest::new("What is Dify?").with_user("user-1"))
///     .await?;
/// println!("{answer}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DifyClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP transport, built on first use.
    http: OnceCell<reqwest::Client>,
    /// Base URL, always ending in `/`.
    base_url: Url,
    credentials: Credentials,
    /// Default per-attempt timeout.
    timeout: Duration,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    user_agent: String,
    /// Keep idle connections between calls.
    pool_idle: bool,
}

/// A request with everything resolved that does not change between attempts.
pub(crate) struct PreparedRequest {
    pub(crate) method: Method,
    pub(crate) url: Url,
    pub(crate) headers: HeaderMap,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Body,
    pub(crate) timeout: Duration,
    pub(crate) policy: RetryPolicy,
    pub(crate) request_id: String,
}

impl PreparedRequest {
    /// Build one attempt's HTTP request.
    pub(crate) fn build(&self, http: &reqwest::Client) -> Result<reqwest::RequestBuilder> {
        let mut builder = http
            .request(self.method.clone(), self.url.clone())
            .headers(self.headers.clone());
        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        self.body.apply(builder)
    }
}

impl DifyClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &DifyConfig) -> Result<Self> {
        ClientBuilder::from_config(config)?.build()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Credential store.
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// Default per-attempt timeout.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Default retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.retry
    }

    /// Whether the shared transport has been created yet.
    pub fn is_connected(&self) -> bool {
        self.inner.http.initialized()
    }

    /// Release this handle.
    ///
    /// The connection pool is closed once every clone has been closed or
    /// dropped. Façade values (`ChatApi`, `DatasetsApi`, ...) each hold a
    /// clone, so they keep the pool alive until they are dropped too.
    pub fn close(self) {
        tracing::debug!(
            remaining_handles = Arc::strong_count(&self.inner) - 1,
            "Closing client handle"
        );
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the chat API.
    pub fn chat(&self) -> ChatApi {
        ChatApi::new(self.clone())
    }

    /// Access the text completion API.
    pub fn completion(&self) -> CompletionApi {
        CompletionApi::new(self.clone())
    }

    /// Access the conversations API.
    pub fn conversations(&self) -> ConversationsApi {
        ConversationsApi::new(self.clone())
    }

    /// Access the feedback API.
    pub fn feedback(&self) -> FeedbackApi {
        FeedbackApi::new(self.clone())
    }

    /// Access the files API.
    pub fn files(&self) -> FilesApi {
        FilesApi::new(self.clone())
    }

    /// Access the models API.
    pub fn models(&self) -> ModelsApi {
        ModelsApi::new(self.clone())
    }

    /// Access the datasets API.
    pub fn datasets(&self) -> DatasetsApi {
        DatasetsApi::new(self.clone())
    }

    /// Access the documents API.
    pub fn documents(&self) -> DocumentsApi {
        DocumentsApi::new(self.clone())
    }

    /// Access the segments API.
    pub fn segments(&self) -> SegmentsApi {
        SegmentsApi::new(self.clone())
    }

    /// Access the knowledge-base tags API.
    pub fn tags(&self) -> TagsApi {
        TagsApi::new(self.clone())
    }

    /// Access the workflows API.
    pub fn workflows(&self) -> WorkflowsApi {
        WorkflowsApi::new(self.clone())
    }

    /// Access the app configuration API.
    pub fn app(&self) -> AppApi {
        AppApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Executor
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        self.inner
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(Error::from)
    }

    /// The shared transport, created on first use.
    pub(crate) async fn http(&self) -> Result<&reqwest::Client> {
        self.inner
            .http
            .get_or_try_init(|| async {
                tracing::debug!(base_url = %self.inner.base_url, "Creating HTTP transport");
                // 3xx answers are surfaced as API errors, never followed.
                let mut builder = reqwest::Client::builder()
                    .user_agent(&self.inner.user_agent)
                    .redirect(reqwest::redirect::Policy::none());
                if !self.inner.pool_idle {
                    builder = builder.pool_max_idle_per_host(0);
                }
                builder.build().map_err(Error::Http)
            })
            .await
    }

    /// Resolve everything about a call that can fail without the network.
    pub(crate) fn prepare(&self, request: Request) -> Result<PreparedRequest> {
        let secret = self.inner.credentials.resolve(request.scope)?;
        endpoints::ensure_resolved(&request.path)?;
        let url = self.url(&request.path)?;

        let request_id = uuid::Uuid::new_v4().to_string();
        let headers = request::build_headers(secret, &request_id, &request.body)?;

        let policy = match request.retries {
            Some(retries) => self.inner.retry.with_max_retries(retries),
            None => self.inner.retry,
        };

        Ok(PreparedRequest {
            method: request.method,
            url,
            headers,
            query: request.query,
            body: request.body,
            timeout: request.timeout.unwrap_or(self.inner.timeout),
            policy,
            request_id,
        })
    }

    pub(crate) fn sleeper(&self) -> &dyn Sleeper {
        self.inner.sleeper.as_ref()
    }

    /// Execute one logical call.
    ///
    /// Transport failures are retried with exponential backoff; any HTTP
    /// response ends the call. A 2xx body is returned as JSON if it parses,
    /// otherwise as text.
    pub async fn execute(&self, request: Request) -> Result<Payload> {
        let prepared = self.prepare(request)?;
        let http = self.http().await?;
        let prepared = &prepared;

        retry::with_retry(
            prepared.policy,
            self.sleeper(),
            &prepared.request_id,
            move |attempt| send_once(http, prepared, attempt),
        )
        .await
    }

    /// Execute and deserialize the response body.
    pub async fn execute_json<T: serde::de::DeserializeOwned>(&self, request: Request) -> Result<T> {
        self.execute(request).await?.deserialize()
    }
}

/// Server-supplied correlation id, if any.
pub(crate) fn server_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

async fn send_once(
    http: &reqwest::Client,
    prepared: &PreparedRequest,
    attempt: u32,
) -> Result<Payload> {
    tracing::debug!(
        method = %prepared.method,
        url = %prepared.url,
        attempt = attempt + 1,
        max_attempts = prepared.policy.max_attempts(),
        request_id = %prepared.request_id,
        "Sending request"
    );

    let response = prepared
        .build(http)?
        .timeout(prepared.timeout)
        .send()
        .await
        .map_err(|e| Error::from_transport(e, prepared.timeout))?;

    let status = response.status();
    let request_id =
        server_request_id(response.headers()).unwrap_or_else(|| prepared.request_id.clone());
    let body = response
        .text()
        .await
        .map_err(|e| Error::from_transport(e, prepared.timeout))?;

    if !status.is_success() {
        return Err(Error::from_status(
            status.as_u16(),
            Payload::from_body(body),
            request_id,
        ));
    }

    tracing::debug!(status = status.as_u16(), request_id = %request_id, "Request succeeded");
    Ok(Payload::from_body(body))
}

/// Builder for creating a [`DifyClient`].
pub struct ClientBuilder {
    base_url: String,
    credentials: Option<Credentials>,
    api_key: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            base_url: dify_config::types::DEFAULT_BASE_URL.to_string(),
            credentials: None,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(TokioSleeper),
            user_agent: None,
        }
    }

    /// Start from loaded configuration.
    pub fn from_config(config: &DifyConfig) -> Result<Self> {
        config.validate()?;
        let credentials = Credentials::from_named(
            config
                .credentials
                .iter()
                .map(|(scope, secret)| (scope.as_str(), secret.as_str())),
        )?;
        Ok(Self::new()
            .base_url(&config.base_url)
            .credentials(credentials)
            .timeout(seconds("timeout_secs", config.timeout_secs)?)
            .retries(config.retries)
            .retry_backoff(seconds("retry_backoff_factor", config.retry_backoff_factor)?))
    }

    /// Set the base URL of the Dify server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Use a single API key for the default scope.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Use an explicit credential store. Takes precedence over [`api_key`](Self::api_key).
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the default per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the default retry count.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retry.max_retries = retries;
        self
    }

    /// Set the backoff factor.
    pub fn retry_backoff(mut self, factor: Duration) -> Self {
        self.retry.backoff_factor = factor;
        self
    }

    /// Replace how the client waits between attempts.
    pub fn sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<DifyClient> {
        self.build_inner(true)
    }

    /// Build a client for synchronous callers.
    pub fn build_blocking(self) -> Result<BlockingClient> {
        Ok(BlockingClient::new(self.build_inner(false)?))
    }

    fn build_inner(self, pool_idle: bool) -> Result<DifyClient> {
        let credentials = match (self.credentials, self.api_key) {
            (Some(credentials), _) => credentials,
            (None, Some(key)) => Credentials::new(key)?,
            (None, None) => {
                return Err(Error::Config(
                    "an API key or credential set is required".to_string(),
                ));
            }
        };

        // Parse and normalize base URL
        let mut base_url = Url::parse(&self.base_url)?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("dify-client/{}", env!("CARGO_PKG_VERSION")));

        Ok(DifyClient {
            inner: Arc::new(ClientInner {
                http: OnceCell::new(),
                base_url,
                credentials,
                timeout: self.timeout,
                retry: self.retry,
                sleeper: self.sleeper,
                user_agent,
                pool_idle,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn seconds(field: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .map_err(|e| Error::Config(format!("{field}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> DifyClient {
        ClientBuilder::new()
            .base_url(base_url)
            .api_key("app-key")
            .build()
            .unwrap()
    }

    #[test]
    fn test_facades_share_the_client_handle() {
        let client = client("https://api.dify.ai");
        let observer = client.clone();
        let chat = client.chat();
        assert_eq!(Arc::strong_count(&observer.inner), 3);

        client.close();
        assert_eq!(Arc::strong_count(&observer.inner), 2);
        drop(chat);
        assert_eq!(Arc::strong_count(&observer.inner), 1);
    }

    #[test]
    fn test_builder_requires_credentials() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_rejects_empty_key() {
        let result = ClientBuilder::new().api_key("").build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_defaults() {
        let client = ClientBuilder::new().api_key("k").build().unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.dify.ai/");
        assert_eq!(client.timeout(), Duration::from_secs(30));
        assert_eq!(client.retry_policy(), RetryPolicy::default());
        assert!(!client.is_connected());
    }

    #[test]
    fn test_builder_normalizes_trailing_slash() {
        assert_eq!(client("http://localhost:8080").base_url().as_str(), "http://localhost:8080/");
        assert_eq!(client("http://localhost:8080/").base_url().as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_url_building() {
        let client = client("http://localhost:8080");
        let url = client.url("/v1/datasets").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v1/datasets");

        let url = client.url("v1/datasets").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v1/datasets");
    }

    #[test]
    fn test_url_building_keeps_base_path() {
        let client = client("http://gateway.local/dify");
        let url = client.url("/v1/chat-messages").unwrap();
        assert_eq!(url.as_str(), "http://gateway.local/dify/v1/chat-messages");
    }

    #[test]
    fn test_prepare_fails_fast_on_missing_scope() {
        let client = client("http://localhost:8080");
        let err = client
            .prepare(Request::get("/v1/datasets").scope(Scope::Dataset))
            .err()
            .unwrap();
        assert!(matches!(err, Error::Config(_)));
        assert!(!client.is_connected());
    }

    #[test]
    fn test_prepare_rejects_unresolved_path() {
        let client = client("http://localhost:8080");
        let err = client.prepare(Request::get("/v1/datasets/{dataset_id}")).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_prepare_applies_overrides() {
        let client = client("http://localhost:8080");
        let prepared = client
            .prepare(
                Request::get("/v1/app/meta")
                    .timeout(Duration::from_millis(250))
                    .retries(0),
            )
            .unwrap();
        assert_eq!(prepared.timeout, Duration::from_millis(250));
        assert_eq!(prepared.policy.max_retries, 0);
        assert_eq!(prepared.policy.backoff_factor, Duration::from_secs(1));
        assert_eq!(prepared.headers[REQUEST_ID_HEADER], prepared.request_id.as_str());
    }

    #[test]
    fn test_request_ids_are_unique_per_call() {
        let client = client("http://localhost:8080");
        let a = client.prepare(Request::get("/v1/app/meta")).unwrap();
        let b = client.prepare(Request::get("/v1/app/meta")).unwrap();
        assert_ne!(a.request_id, b.request_id);
    }

    #[test]
    fn test_from_config() {
        let mut config = DifyConfig::with_api_key("app-key");
        config.base_url = "http://dify.internal".to_string();
        config.timeout_secs = 2.5;
        config.retries = 1;
        config.retry_backoff_factor = 0.5;
        config
            .credentials
            .insert("dataset".to_string(), "ds-key".to_string());

        let client = DifyClient::from_config(&config).unwrap();
        assert_eq!(client.base_url().as_str(), "http://dify.internal/");
        assert_eq!(client.timeout(), Duration::from_millis(2500));
        assert_eq!(
            client.retry_policy(),
            RetryPolicy::new(1, Duration::from_millis(500))
        );
        assert_eq!(client.credentials().resolve(Scope::Dataset).unwrap(), "ds-key");
    }

    #[test]
    fn test_from_config_rejects_unknown_scope() {
        let mut config = DifyConfig::with_api_key("app-key");
        config
            .credentials
            .insert("billing".to_string(), "b".to_string());
        assert!(matches!(
            DifyClient::from_config(&config),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_transport_is_created_once_and_shared() {
        let client = client("http://localhost:8080");
        let clone = client.clone();
        let first = client.http().await.unwrap() as *const reqwest::Client;
        let second = clone.http().await.unwrap() as *const reqwest::Client;
        assert_eq!(first, second);
        assert!(client.is_connected());
        clone.close();
        assert!(client.is_connected());
    }
}
