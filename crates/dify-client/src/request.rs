//! Request descriptors.
//!
//! A [`Request`] is everything the executor needs for one logical call. Bodies
//! are held as owned data so every retry attempt rebuilds an identical HTTP
//! request.

use std::path::Path;
use std::time::Duration;

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE,
};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::credentials::Scope;
use crate::error::{Error, Result};

/// Header carrying the correlation id.
pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// A file to upload as one multipart field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    field: String,
    file_name: String,
    content: Vec<u8>,
    content_type: Option<String>,
}

impl FilePart {
    /// Upload `content` as field `file` under `file_name`.
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            field: "file".to_string(),
            file_name: file_name.into(),
            content: content.into(),
            content_type: None,
        }
    }

    /// Read a local file. The upload is named after the file's last path component.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::Config(format!("'{}' does not name a file", path.display()))
            })?;
        Ok(Self::new(file_name, content))
    }

    /// Set the part's MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Send under a different form field name.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    /// Upload name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Size of the content in bytes.
    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Whether the content is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    fn to_part(&self) -> Result<Part> {
        let part = Part::bytes(self.content.clone()).file_name(self.file_name.clone());
        match &self.content_type {
            Some(content_type) => part
                .mime_str(content_type)
                .map_err(|_| Error::Config(format!("invalid content type '{content_type}'"))),
            None => Ok(part),
        }
    }
}

/// Request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// JSON document.
    Json(Value),
    /// `application/x-www-form-urlencoded` pairs.
    Form(Vec<(String, String)>),
    /// `multipart/form-data` with text fields and files.
    Multipart {
        /// Plain text fields.
        fields: Vec<(String, String)>,
        /// File fields.
        files: Vec<FilePart>,
    },
}

impl Body {
    fn multipart_form(fields: &[(String, String)], files: &[FilePart]) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name.clone(), value.clone());
        }
        for file in files {
            form = form.part(file.field.clone(), file.to_part()?);
        }
        Ok(form)
    }

    /// Attach this body to an outgoing request.
    pub(crate) fn apply(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::RequestBuilder> {
        Ok(match self {
            Body::Empty => builder,
            Body::Json(value) => builder.json(value),
            Body::Form(pairs) => builder.form(pairs),
            Body::Multipart { fields, files } => {
                builder.multipart(Self::multipart_form(fields, files)?)
            }
        })
    }
}

/// One logical API call.
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) scope: Scope,
    pub(crate) body: Body,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) timeout: Option<Duration>,
    pub(crate) retries: Option<u32>,
}

impl Request {
    /// Create a request for a resolved path, authorized by the default scope.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            scope: Scope::Default,
            body: Body::Empty,
            query: Vec::new(),
            timeout: None,
            retries: None,
        }
    }

    /// GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// PATCH request.
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Select the credential scope.
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Send `body` as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.body = Body::Json(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Send a pre-built JSON value.
    pub fn json_value(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    /// Send form-encoded pairs.
    pub fn form<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Body::Form(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Add a file to a multipart body.
    ///
    /// Form pairs already set are kept as text fields. A JSON body is
    /// replaced.
    pub fn file(mut self, file: FilePart) -> Self {
        self.make_multipart();
        if let Body::Multipart { files, .. } = &mut self.body {
            files.push(file);
        }
        self
    }

    /// Add a text field to a multipart body.
    ///
    /// Converts the body the same way as [`file`](Self::file).
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.make_multipart();
        if let Body::Multipart { fields, .. } = &mut self.body {
            fields.push((name.into(), value.into()));
        }
        self
    }

    fn make_multipart(&mut self) {
        self.body = match std::mem::replace(&mut self.body, Body::Empty) {
            multipart @ Body::Multipart { .. } => multipart,
            Body::Form(fields) => Body::Multipart {
                fields,
                files: Vec::new(),
            },
            Body::Empty | Body::Json(_) => Body::Multipart {
                fields: Vec::new(),
                files: Vec::new(),
            },
        };
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a query parameter if present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Append a list parameter as repeated keys (`k=a&k=b`).
    pub fn query_all<I>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator,
        I::Item: ToString,
    {
        self.query
            .extend(values.into_iter().map(|v| (key.to_string(), v.to_string())));
        self
    }

    /// Override the client's per-attempt timeout for this call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the client's retry count for this call.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Resolved path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Credential scope.
    pub fn credential_scope(&self) -> Scope {
        self.scope
    }

    /// Body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Query pairs in insertion order.
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }
}

/// Build the headers shared by every attempt of one call.
///
/// Multipart bodies get no content type here; the transport sets it together
/// with the boundary.
pub(crate) fn build_headers(secret: &str, request_id: &str, body: &Body) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let mut auth = HeaderValue::from_str(&format!("Bearer {secret}"))
        .map_err(|_| Error::Config("credential is not a valid header value".to_string()))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    match body {
        Body::Multipart { .. } => {}
        Body::Form(_) => {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            );
        }
        Body::Empty | Body::Json(_) => {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
    }

    let id = HeaderValue::from_str(request_id)
        .map_err(|_| Error::Config(format!("invalid request id '{request_id}'")))?;
    headers.insert(REQUEST_ID_HEADER, id);

    Ok(headers)
}
