//! # Composable Request reqwest transport
//!
//! [`ReqwestClient`] implements [`HttpClient`] on top of `reqwest`.
//!
//! Body mapping:
//!
//! - `RequestBody::Json` is serialized as a JSON body
//! - `RequestBody::UrlEncoded` is sent as `application/x-www-form-urlencoded`
//! - `RequestBody::FormData` holding an object becomes a multipart form with
//!   one text part per field; any other value is sent as a plain text body
//!
//! Non-2xx responses are rejected as [`TransportError::Status`]. Response
//! bodies that are not JSON are kept as `Value::String`.
//!
//! ```no_run
//! use composable_request_core::GlobalConfig;
//! use composable_request_reqwest::ReqwestClient;
//! use composable_request_runtime::RequestController;
//! use std::sync::Arc;
//!
//! let controller = RequestController::new(Arc::new(ReqwestClient::new()), GlobalConfig::new());
//! ```

use composable_request_core::{
    ContentType, HttpClient, HttpRequest, HttpResponse, RequestBody, TransportError,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::{Client, Method};
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;

/// `HttpClient` backed by a shared `reqwest::Client`
#[derive(Debug, Clone, Default)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Create a client with reqwest's default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Wrap an already configured `reqwest::Client`
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        tracing::debug!(%method, url = %request.url, "Sending HTTP request");

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            None => builder,
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::UrlEncoded(encoded)) => builder
                .header(CONTENT_TYPE, ContentType::UrlEncoded.mime())
                .body(encoded),
            Some(RequestBody::FormData(Value::Object(fields))) => {
                builder.multipart(multipart_form(fields))
            },
            Some(RequestBody::FormData(other)) => builder.body(field_text(other)),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "HTTP request rejected by status");
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            headers,
            body: parse_body(text),
        })
    }
}

impl HttpClient for ReqwestClient {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + '_>> {
        Box::pin(self.send(request))
    }
}

/// JSON when it parses, the raw text otherwise, `Null` when empty
fn parse_body(text: String) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

fn multipart_form(fields: Map<String, Value>) -> Form {
    fields
        .into_iter()
        .fold(Form::new(), |form, (name, value)| form.text(name, field_text(value)))
}

fn field_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
