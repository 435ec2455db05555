//! Controller-wide configuration.
//!
//! [`GlobalConfig`] carries the optional hooks shared by every request a
//! controller issues. Each field is independently omittable:
//!
//! - `default_options`: merged into every request, the description wins
//! - `classify_error`: decides whether a transported response is a logical error
//! - `on_logical_error`: called when a response is classified as an error
//! - `on_transport_error`: called when the collaborator fails
//! - `format_response`: default transform when a description has none
//! - `query_encoder`: query-string collaborator (defaults to [`QsEncoder`])
//!
//! # Example
//!
//! ```
//! use composable_request_core::{GlobalConfig, HttpResponse, RequestOptions};
//! use serde_json::json;
//!
//! let config = GlobalConfig::new()
//!     .with_default_options(RequestOptions::new().with_base_url("https://api.example.com"))
//!     .with_format_response(|res| res.body["data"].clone())
//!     .with_classify_error(|res| res.body["ok"] != json!(true));
//!
//! assert!(config.is_logical_error(&HttpResponse::ok(json!({ "ok": false }))));
//! ```

use crate::encoding::{QsEncoder, QueryEncoder};
use crate::error::TransportError;
use crate::http::HttpResponse;
use crate::request::{ContentType, HttpMethod, Payload, RequestDescription};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Returns true when a transported response should count as a logical error.
pub type ErrorClassifier = Arc<dyn Fn(&HttpResponse) -> bool + Send + Sync>;

/// Invoked with the response and the merged configuration on a logical error.
pub type LogicalErrorHook = Arc<dyn Fn(&HttpResponse, &MergedConfig) + Send + Sync>;

/// Invoked when the HTTP collaborator fails.
pub type TransportErrorHook = Arc<dyn Fn(&TransportError) + Send + Sync>;

/// Default response transform, producing the value stored as view-state data.
pub type ResponseFormatter = Arc<dyn Fn(&HttpResponse) -> Value + Send + Sync>;

/// Default classification: a body `code` other than `0` is a logical error.
///
/// A body without a `code` field, or a non-object body, is a success.
#[must_use]
pub fn default_classify_error(response: &HttpResponse) -> bool {
    response
        .code()
        .is_some_and(|code| code.as_f64() != Some(0.0))
}

fn has_success_code(response: &HttpResponse) -> bool {
    response.code().and_then(Value::as_f64) == Some(0.0)
}

/// Request options applied to every request of a controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Prefix joined with relative description URLs
    pub base_url: Option<String>,

    /// Method used when a description sets none
    pub method: Option<HttpMethod>,

    /// Headers sent with every request
    pub headers: BTreeMap<String, String>,
}

impl RequestOptions {
    /// Create empty options
    #[must_use]
    pub const fn new() -> Self {
        Self {
            base_url: None,
            method: None,
            headers: BTreeMap::new(),
        }
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the fallback method
    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method);
        self
    }

    /// Add a default header
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Resolve a description URL against the base URL.
    ///
    /// Absolute URLs (with a scheme) and an unset base are returned unchanged.
    #[must_use]
    pub fn resolve_url(&self, url: &str) -> String {
        match &self.base_url {
            Some(base) if !url.contains("://") => {
                if url.is_empty() {
                    base.clone()
                } else {
                    format!("{}/{}", base.trim_end_matches('/'), url.trim_start_matches('/'))
                }
            },
            _ => url.to_string(),
        }
    }
}

/// Global defaults overlaid by one description, with the trigger-time payload.
///
/// This is what the logical-error hook receives.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    /// URL after base-URL resolution, before encoding
    pub url: String,
    /// Resolved method
    pub method: HttpMethod,
    /// Default headers overlaid by description headers
    pub headers: BTreeMap<String, String>,
    /// Description payload overlaid by the trigger-time payload
    pub config_datas: Payload,
    /// Content type for body-bearing methods
    pub content_type: ContentType,
    /// Encode into the URL for body-bearing methods
    pub encode_into_url: bool,
    /// Automatic trigger flag
    pub trigger: bool,
}

impl MergedConfig {
    /// Headers as an ordered list, the shape the transport expects
    #[must_use]
    pub fn header_list(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

/// Controller-wide hooks and defaults.
#[derive(Clone)]
pub struct GlobalConfig {
    default_options: RequestOptions,
    classify_error: Option<ErrorClassifier>,
    on_logical_error: Option<LogicalErrorHook>,
    on_transport_error: Option<TransportErrorHook>,
    format_response: Option<ResponseFormatter>,
    query_encoder: Arc<dyn QueryEncoder>,
}

impl GlobalConfig {
    /// Create a configuration with no hooks and no defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_options: RequestOptions::new(),
            classify_error: None,
            on_logical_error: None,
            on_transport_error: None,
            format_response: None,
            query_encoder: Arc::new(QsEncoder),
        }
    }

    /// Set the default request options
    #[must_use]
    pub fn with_default_options(mut self, options: RequestOptions) -> Self {
        self.default_options = options;
        self
    }

    /// Replace the default `body.code` classification
    #[must_use]
    pub fn with_classify_error<F>(mut self, classify: F) -> Self
    where
        F: Fn(&HttpResponse) -> bool + Send + Sync + 'static,
    {
        self.classify_error = Some(Arc::new(classify));
        self
    }

    /// Set the logical-error hook
    #[must_use]
    pub fn with_on_logical_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&HttpResponse, &MergedConfig) + Send + Sync + 'static,
    {
        self.on_logical_error = Some(Arc::new(hook));
        self
    }

    /// Set the transport-error hook
    #[must_use]
    pub fn with_on_transport_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&TransportError) + Send + Sync + 'static,
    {
        self.on_transport_error = Some(Arc::new(hook));
        self
    }

    /// Set the default response transform
    #[must_use]
    pub fn with_format_response<F>(mut self, format: F) -> Self
    where
        F: Fn(&HttpResponse) -> Value + Send + Sync + 'static,
    {
        self.format_response = Some(Arc::new(format));
        self
    }

    /// Replace the query-string encoder
    #[must_use]
    pub fn with_query_encoder(mut self, encoder: impl QueryEncoder + 'static) -> Self {
        self.query_encoder = Arc::new(encoder);
        self
    }

    /// Default request options
    #[must_use]
    pub const fn default_options(&self) -> &RequestOptions {
        &self.default_options
    }

    /// Query-string encoder
    #[must_use]
    pub fn query_encoder(&self) -> &dyn QueryEncoder {
        self.query_encoder.as_ref()
    }

    /// Classify a transported response.
    ///
    /// A body `code` of `0` is always a success. Any other response goes to
    /// the supplied classifier, or to [`default_classify_error`] without one.
    #[must_use]
    pub fn is_logical_error(&self, response: &HttpResponse) -> bool {
        if has_success_code(response) {
            return false;
        }
        self.classify_error
            .as_ref()
            .map_or_else(|| default_classify_error(response), |classify| classify(response))
    }

    /// Value to store as view-state data when no per-call transform is set
    #[must_use]
    pub fn format_response(&self, response: &HttpResponse) -> Value {
        self.format_response
            .as_ref()
            .map_or_else(|| response.body.clone(), |format| format(response))
    }

    /// Invoke the logical-error hook, if any
    pub fn notify_logical_error(&self, response: &HttpResponse, merged: &MergedConfig) {
        if let Some(hook) = &self.on_logical_error {
            hook(response, merged);
        }
    }

    /// Invoke the transport-error hook, if any
    pub fn notify_transport_error(&self, error: &TransportError) {
        if let Some(hook) = &self.on_transport_error {
            hook(error);
        }
    }

    /// Overlay a description (and the trigger-time payload) on the defaults.
    ///
    /// Scalar options: the description wins when set. Headers merge key by
    /// key with description headers winning. `extra` entries override
    /// description payload entries of the same key.
    #[must_use]
    pub fn merge<T>(&self, description: &RequestDescription<T>, extra: Option<&Payload>) -> MergedConfig {
        let mut headers = self.default_options.headers.clone();
        headers.extend(
            description
                .headers()
                .iter()
                .map(|(name, value)| (name.clone(), value.clone())),
        );

        let mut config_datas = description.config_datas().clone();
        if let Some(extra) = extra {
            config_datas.extend(extra.iter().map(|(key, value)| (key.clone(), value.clone())));
        }

        MergedConfig {
            url: self.default_options.resolve_url(description.url()),
            method: description
                .method()
                .or(self.default_options.method)
                .unwrap_or(HttpMethod::Get),
            headers,
            config_datas,
            content_type: description.content_type(),
            encode_into_url: description.encode_into_url(),
            trigger: description.trigger(),
        }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self::new()
    }
}

// Manual Debug implementation since hooks don't implement Debug
impl fmt::Debug for GlobalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalConfig")
            .field("default_options", &self.default_options)
            .field("classify_error", &self.classify_error.is_some())
            .field("on_logical_error", &self.on_logical_error.is_some())
            .field("on_transport_error", &self.on_transport_error.is_some())
            .field("format_response", &self.format_response.is_some())
            .finish_non_exhaustive()
    }
}
