//! Scripted HTTP client for deterministic tests.
//!
//! [`MockHttpClient`] answers each `execute` call with the next scripted
//! outcome, in order, and records every request it receives. An exhausted
//! script answers with a transport error so a missing response fails loudly
//! in the test instead of hanging.

#![allow(clippy::module_name_repetitions)]

use composable_request_core::{HttpClient, HttpRequest, HttpResponse, TransportError};
use serde_json::Value;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

type Outcome = Result<HttpResponse, TransportError>;

enum Scripted {
    Ready(Outcome),
    Deferred(oneshot::Receiver<Outcome>),
}

/// An `HttpClient` that replays scripted responses.
///
/// # Example
///
/// ```
/// use composable_request_core::{HttpClient, HttpMethod, HttpRequest};
/// use composable_request_testing::MockHttpClient;
/// use serde_json::json;
///
/// # async fn example() {
/// let client = MockHttpClient::new();
/// client.enqueue_ok(json!({"code": 0}));
///
/// let request = HttpRequest {
///     method: HttpMethod::Get,
///     url: "/x".into(),
///     headers: Vec::new(),
///     body: None,
/// };
/// let response = client.execute(request).await.unwrap();
///
/// assert_eq!(response.status, 200);
/// assert_eq!(client.last_request().unwrap().url, "/x");
/// # }
/// ```
#[derive(Default)]
pub struct MockHttpClient {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    /// Create a client with an empty script
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a `200` response with the given body
    pub fn enqueue_ok(&self, body: Value) {
        self.enqueue(HttpResponse::ok(body));
    }

    /// Script a response
    pub fn enqueue(&self, response: HttpResponse) {
        lock(&self.script).push_back(Scripted::Ready(Ok(response)));
    }

    /// Script a transport failure
    pub fn enqueue_error(&self, error: TransportError) {
        lock(&self.script).push_back(Scripted::Ready(Err(error)));
    }

    /// Script an outcome the test resolves later.
    ///
    /// The matching `execute` call stays pending until
    /// [`DeferredResponse::resolve`] is called. Dropping the
    /// [`DeferredResponse`] settles it as a transport error.
    #[must_use]
    pub fn enqueue_deferred(&self) -> DeferredResponse {
        let (sender, receiver) = oneshot::channel();
        lock(&self.script).push_back(Scripted::Deferred(receiver));
        DeferredResponse { sender }
    }

    /// Every request received so far, in order
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        lock(&self.requests).clone()
    }

    /// The most recent request
    #[must_use]
    pub fn last_request(&self) -> Option<HttpRequest> {
        lock(&self.requests).last().cloned()
    }

    /// Number of requests received
    #[must_use]
    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }
}

impl HttpClient for MockHttpClient {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + '_>> {
        lock(&self.requests).push(request);
        let next = lock(&self.script).pop_front();

        Box::pin(async move {
            match next {
                Some(Scripted::Ready(outcome)) => outcome,
                Some(Scripted::Deferred(receiver)) => receiver.await.unwrap_or_else(|_| {
                    Err(TransportError::RequestFailed(
                        "deferred response dropped".to_string(),
                    ))
                }),
                None => Err(TransportError::RequestFailed(
                    "no scripted response left".to_string(),
                )),
            }
        })
    }
}

/// Resolves one pending `execute` call of a [`MockHttpClient`].
#[derive(Debug)]
pub struct DeferredResponse {
    sender: oneshot::Sender<Outcome>,
}

impl DeferredResponse {
    /// Settle the pending call
    pub fn resolve(self, outcome: Result<HttpResponse, TransportError>) {
        // The caller may have stopped waiting
        let _ = self.sender.send(outcome);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
