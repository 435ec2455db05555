//! HTTP collaborator contract.
//!
//! Requests and responses are plain data. The core never touches the
//! network: an [`HttpClient`] implementation (reqwest in production, a mock
//! in tests) executes the request and hands back an [`HttpResponse`].

use crate::error::TransportError;
use crate::request::HttpMethod;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;

/// Body attached to an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// The payload mapping, serialized as JSON by the collaborator
    Json(Value),

    /// An already URL-encoded string
    UrlEncoded(String),

    /// The value found under the `formData` payload key
    FormData(Value),
}

/// A concrete HTTP request, ready for the collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP method
    pub method: HttpMethod,

    /// Final URL, including any encoded query string
    pub url: String,

    /// Request headers in the order they were resolved
    pub headers: Vec<(String, String)>,

    /// Request body, if the encoding step produced one
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// Look up a header by case-insensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A settled HTTP response.
///
/// The body is kept as a JSON value. Transports decode JSON bodies and wrap
/// anything else in `Value::String`.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers
    pub headers: Vec<(String, String)>,

    /// Response body
    pub body: Value,
}

impl HttpResponse {
    /// Create a response with no headers
    #[must_use]
    pub const fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    /// Create a `200 OK` response with the given body
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// Application-level status code embedded in the body (`body.code`)
    #[must_use]
    pub fn code(&self) -> Option<&Value> {
        self.body.get("code")
    }

    /// Look up a header by case-insensitive name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// The transport collaborator.
///
/// Any client able to send a method/url/headers/body request and return a
/// response or an error can back a controller.
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of `async fn`
/// so controllers can share it as `Arc<dyn HttpClient>`.
///
/// # Example
///
/// ```
/// use composable_request_core::{HttpClient, HttpRequest, HttpResponse, TransportError};
/// use std::future::Future;
/// use std::pin::Pin;
///
/// struct Echo;
///
/// impl HttpClient for Echo {
///     fn execute(
///         &self,
///         request: HttpRequest,
///     ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + '_>> {
///         Box::pin(async move { Ok(HttpResponse::ok(serde_json::json!({ "url": request.url }))) })
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Execute one request.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no usable response was obtained. Whether
    /// non-2xx statuses count as failures is up to the implementation.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + '_>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_code_reads_body_field() {
        let response = HttpResponse::ok(json!({ "code": 0, "data": { "id": 7 } }));
        assert_eq!(response.code(), Some(&json!(0)));

        let plain = HttpResponse::ok(json!("not an object"));
        assert_eq!(plain.code(), None);
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let mut response = HttpResponse::ok(Value::Null);
        response
            .headers
            .push(("Content-Type".to_string(), "application/json".to_string()));

        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
    }
}
