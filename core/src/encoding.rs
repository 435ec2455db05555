//! Parameter encoding.
//!
//! Decides where the payload of a request goes, by method first and content
//! type second:
//!
//! | Method | Condition | URL | Body |
//! |---|---|---|---|
//! | any | empty payload | unchanged | none |
//! | `GET`, `DELETE` | | query appended | none |
//! | `POST`, `PUT`, `PATCH` | `encode_into_url` | query appended | none |
//! | `POST`, `PUT`, `PATCH` | `UrlEncoded` | unchanged | encoded string |
//! | `POST`, `PUT`, `PATCH` | `FormData` | unchanged | `payload["formData"]` |
//! | `POST`, `PUT`, `PATCH` | `Json` | unchanged | payload mapping |
//! | `HEAD`, `OPTIONS` | | unchanged | none |
//!
//! Queries are joined with `?` when the URL has none yet, `&` otherwise.

use crate::error::EncodingError;
use crate::http::RequestBody;
use crate::request::{ContentType, HttpMethod, Payload};
use serde_json::Value;

/// Key whose value becomes the body of a `FormData` request.
pub const FORM_DATA_KEY: &str = "formData";

/// Query-string collaborator: maps a payload to a URL-encoded string.
pub trait QueryEncoder: Send + Sync {
    /// Encode the payload.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::Unsupported`] if the payload cannot be represented.
    fn encode(&self, payload: &Payload) -> Result<String, EncodingError>;
}

/// Default query encoder.
///
/// Scalars become `key=value`, `null` becomes `key=`, and nested objects
/// and arrays use bracket notation (`user[name]=ada`, `ids[0]=3`). Empty
/// objects and arrays produce nothing. Percent-encoding is delegated to
/// `serde_urlencoded`.
#[derive(Debug, Clone, Copy, Default)]
pub struct QsEncoder;

impl QueryEncoder for QsEncoder {
    fn encode(&self, payload: &Payload) -> Result<String, EncodingError> {
        let mut pairs = Vec::with_capacity(payload.len());
        for (key, value) in payload {
            flatten(key.clone(), value, &mut pairs);
        }
        serde_urlencoded::to_string(&pairs).map_err(|e| EncodingError::Unsupported(e.to_string()))
    }
}

fn flatten(prefix: String, value: &Value, pairs: &mut Vec<(String, String)>) {
    match value {
        Value::Null => pairs.push((prefix, String::new())),
        Value::Bool(flag) => pairs.push((prefix, flag.to_string())),
        Value::Number(number) => pairs.push((prefix, number.to_string())),
        Value::String(text) => pairs.push((prefix, text.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten(format!("{prefix}[{index}]"), item, pairs);
            }
        },
        Value::Object(map) => {
            for (key, item) in map {
                flatten(format!("{prefix}[{key}]"), item, pairs);
            }
        },
    }
}

/// URL and body after the encoding step.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRequest {
    /// URL, possibly with an appended query string
    pub url: String,

    /// Body, if one was produced
    pub body: Option<RequestBody>,
}

impl EncodedRequest {
    fn unchanged(url: &str) -> Self {
        Self {
            url: url.to_string(),
            body: None,
        }
    }
}

/// Append an encoded query to a URL, joining with `?` or `&`.
///
/// An empty query leaves the URL untouched.
#[must_use]
pub fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let delimiter = if url.contains('?') { '&' } else { '?' };
    format!("{url}{delimiter}{query}")
}

/// Attach a payload to a request according to method and content type.
///
/// # Errors
///
/// Returns [`EncodingError`] if the query encoder rejects the payload.
///
/// # Example
///
/// ```
/// use composable_request_core::{ContentType, HttpMethod, Payload, QsEncoder, encode_params};
/// use serde_json::json;
///
/// let mut payload = Payload::new();
/// payload.insert("q".to_string(), json!(1));
///
/// let encoded = encode_params("/api/x", HttpMethod::Get, ContentType::Json, false, &payload, &QsEncoder)?;
/// assert_eq!(encoded.url, "/api/x?q=1");
/// assert!(encoded.body.is_none());
/// # Ok::<(), composable_request_core::EncodingError>(())
/// ```
pub fn encode_params(
    url: &str,
    method: HttpMethod,
    content_type: ContentType,
    encode_into_url: bool,
    payload: &Payload,
    encoder: &dyn QueryEncoder,
) -> Result<EncodedRequest, EncodingError> {
    if payload.is_empty() {
        return Ok(EncodedRequest::unchanged(url));
    }

    let encoded = match method {
        HttpMethod::Get | HttpMethod::Delete => EncodedRequest {
            url: append_query(url, &encoder.encode(payload)?),
            body: None,
        },
        HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch => {
            if encode_into_url {
                EncodedRequest {
                    url: append_query(url, &encoder.encode(payload)?),
                    body: None,
                }
            } else {
                let body = match content_type {
                    ContentType::UrlEncoded => Some(RequestBody::UrlEncoded(encoder.encode(payload)?)),
                    ContentType::FormData => payload.get(FORM_DATA_KEY).cloned().map(RequestBody::FormData),
                    ContentType::Json => Some(RequestBody::Json(Value::Object(payload.clone()))),
                };
                EncodedRequest {
                    url: url.to_string(),
                    body,
                }
            }
        },
        HttpMethod::Head | HttpMethod::Options => EncodedRequest::unchanged(url),
    };

    tracing::trace!(%method, url = %encoded.url, has_body = encoded.body.is_some(), "Encoded request parameters");
    Ok(encoded)
}
