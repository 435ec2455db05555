//! Declarative request descriptions.
//!
//! A [`RequestDescription`] is what a UI component hands over on every
//! render. It is a plain value: building one performs no I/O.
//!
//! ```
//! use composable_request_core::{ContentType, HttpMethod, RequestDescription};
//! use serde_json::json;
//!
//! let description = RequestDescription::<serde_json::Value>::new("/api/users")
//!     .with_method(HttpMethod::Post)
//!     .with_content_type(ContentType::UrlEncoded)
//!     .with_data("name", json!("ada"))
//!     .with_trigger(false);
//!
//! assert_eq!(description.url(), "/api/users");
//! assert_eq!(description.config_datas().len(), 1);
//! ```

use crate::http::HttpResponse;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Free-form request payload, keyed by parameter name.
pub type Payload = serde_json::Map<String, Value>;

/// Per-call transform from the raw response to the view-state payload.
pub type ResponseTransform<T> = Arc<dyn Fn(&HttpResponse) -> T + Send + Sync>;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
}

impl HttpMethod {
    /// Upper-case method name as sent on the wire
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a body-bearing request carries its payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// The payload mapping itself is the body
    #[default]
    Json,
    /// The payload is URL-encoded into the body
    UrlEncoded,
    /// The value under the `formData` key is the body
    FormData,
}

impl ContentType {
    /// MIME type matching this content type
    #[must_use]
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::UrlEncoded => "application/x-www-form-urlencoded",
            Self::FormData => "multipart/form-data",
        }
    }
}

/// Inputs for one logical request plus its controller options.
///
/// Defaults: method unset (resolved to `GET` unless the global defaults say
/// otherwise), no headers, empty payload, `trigger = true`,
/// `ContentType::Json`, `encode_into_url = false`, no transform.
pub struct RequestDescription<T> {
    url: String,
    method: Option<HttpMethod>,
    headers: BTreeMap<String, String>,
    config_datas: Payload,
    trigger: bool,
    content_type: ContentType,
    encode_into_url: bool,
    handle_data: Option<ResponseTransform<T>>,
}

impl<T> RequestDescription<T> {
    /// Create a description for the given URL with default options
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: None,
            headers: BTreeMap::new(),
            config_datas: Payload::new(),
            trigger: true,
            content_type: ContentType::Json,
            encode_into_url: false,
            handle_data: None,
        }
    }

    /// Set the HTTP method
    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Add a request header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace the whole payload mapping
    #[must_use]
    pub fn with_config_datas(mut self, payload: Payload) -> Self {
        self.config_datas = payload;
        self
    }

    /// Add a single payload entry
    #[must_use]
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config_datas.insert(key.into(), value.into());
        self
    }

    /// Whether the request fires automatically when its identity changes
    #[must_use]
    pub fn with_trigger(mut self, trigger: bool) -> Self {
        self.trigger = trigger;
        self
    }

    /// Set the content type used by body-bearing methods
    #[must_use]
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Encode the payload into the URL even for `POST`, `PUT` and `PATCH`
    #[must_use]
    pub fn with_encode_into_url(mut self, encode_into_url: bool) -> Self {
        self.encode_into_url = encode_into_url;
        self
    }

    /// Set the per-call response transform
    #[must_use]
    pub fn with_handle_data<F>(mut self, transform: F) -> Self
    where
        F: Fn(&HttpResponse) -> T + Send + Sync + 'static,
    {
        self.handle_data = Some(Arc::new(transform));
        self
    }

    /// Target URL before encoding
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Method, if one was set on the description
    #[must_use]
    pub const fn method(&self) -> Option<HttpMethod> {
        self.method
    }

    /// Request headers
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Payload mapping
    #[must_use]
    pub const fn config_datas(&self) -> &Payload {
        &self.config_datas
    }

    /// Automatic trigger flag
    #[must_use]
    pub const fn trigger(&self) -> bool {
        self.trigger
    }

    /// Content type for body-bearing methods
    #[must_use]
    pub const fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Whether body-bearing methods encode into the URL
    #[must_use]
    pub const fn encode_into_url(&self) -> bool {
        self.encode_into_url
    }

    /// Per-call response transform
    #[must_use]
    pub const fn handle_data(&self) -> Option<&ResponseTransform<T>> {
        self.handle_data.as_ref()
    }

    /// Payload mapping serialized to a string, used as identity for re-triggering
    #[must_use]
    pub fn payload_identity(&self) -> String {
        Value::Object(self.config_datas.clone()).to_string()
    }
}

impl<T> Clone for RequestDescription<T> {
    fn clone(&self) -> Self {
        Self {
            url: self.url.clone(),
            method: self.method,
            headers: self.headers.clone(),
            config_datas: self.config_datas.clone(),
            trigger: self.trigger,
            content_type: self.content_type,
            encode_into_url: self.encode_into_url,
            handle_data: self.handle_data.clone(),
        }
    }
}

// Manual Debug implementation since the transform closure doesn't implement Debug
impl<T> fmt::Debug for RequestDescription<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescription")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers)
            .field("config_datas", &self.config_datas)
            .field("trigger", &self.trigger)
            .field("content_type", &self.content_type)
            .field("encode_into_url", &self.encode_into_url)
            .field("handle_data", &self.handle_data.as_ref().map(|_| "<transform>"))
            .finish()
    }
}
