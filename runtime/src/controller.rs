//! Request controller and per-request handles.
//!
//! A [`RequestController`] shares one HTTP client and one [`GlobalConfig`]
//! between any number of [`RequestHandle`]s. Each handle owns the view state
//! of a single request description and runs the lifecycle
//! `Idle → Loading → Settled` every time it is triggered.
//!
//! # Settlement guards
//!
//! A settlement only mutates the view state when both hold:
//!
//! - the handle's [`LivenessCheck`] still returns `true`
//! - no newer trigger has been issued on the same handle
//!
//! A discarded settlement still returns its response (or error) to the
//! caller, and the transport-error hook still fires.

use crate::auto_trigger::AutoTrigger;
use crate::liveness::{LivenessCheck, always_alive};
use crate::metrics::RequestMetrics;
use crate::store::Store;
use composable_request_core::{
    FetchAction, FetchReducer, GlobalConfig, HttpClient, HttpRequest, HttpResponse, MergedConfig,
    Payload, RequestDescription, RequestError, ResponseTransform, ViewState, encode_params,
};
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Outcome of a spawned automatic trigger
pub type TriggerTask = JoinHandle<Result<HttpResponse, RequestError>>;

/// Factory for request handles sharing a client and global hooks.
///
/// # Example
///
/// ```ignore
/// let controller = RequestController::new(client, GlobalConfig::new());
/// let (state, handle) = controller
///     .use_request::<Vec<User>>(RequestDescription::new("/api/users"))
///     .await;
/// assert!(state.loading);
/// ```
#[derive(Clone)]
pub struct RequestController {
    client: Arc<dyn HttpClient>,
    config: Arc<GlobalConfig>,
}

impl RequestController {
    /// Create a controller from a client and global configuration
    #[must_use]
    pub fn new(client: Arc<dyn HttpClient>, config: GlobalConfig) -> Self {
        Self {
            client,
            config: Arc::new(config),
        }
    }

    /// Controller with no global hooks or defaults
    #[must_use]
    pub fn with_client(client: Arc<dyn HttpClient>) -> Self {
        Self::new(client, GlobalConfig::default())
    }

    /// The shared global configuration
    #[must_use]
    pub fn config(&self) -> &GlobalConfig {
        &self.config
    }

    /// Create a handle for a description without triggering it
    #[must_use]
    pub fn request<T>(&self, description: RequestDescription<T>) -> RequestHandle<T>
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        RequestHandle {
            inner: Arc::new(HandleInner {
                client: Arc::clone(&self.client),
                config: Arc::clone(&self.config),
                description: Mutex::new(description),
                store: Store::new(ViewState::new(), FetchReducer::new()),
                liveness: Mutex::new(always_alive()),
                sequence: AtomicU64::new(0),
                auto_trigger: AutoTrigger::new(),
            }),
        }
    }

    /// Create a handle, run automatic triggering once, and snapshot its state.
    ///
    /// When the description has `trigger = true` and a non-empty URL, the
    /// request is already issued and the returned state is loading. The
    /// request settles in the background.
    pub async fn use_request<T>(
        &self,
        description: RequestDescription<T>,
    ) -> (ViewState<T>, RequestHandle<T>)
    where
        T: DeserializeOwned + Clone + Send + Sync + 'static,
    {
        let handle = self.request(description);
        // Detached: the settlement lands in the handle's store
        let _ = handle.observe_description().await;
        (handle.view_state().await, handle)
    }
}

struct HandleInner<T> {
    client: Arc<dyn HttpClient>,
    config: Arc<GlobalConfig>,
    description: Mutex<RequestDescription<T>>,
    store: Store<ViewState<T>, FetchAction<T>, FetchReducer<T>>,
    liveness: Mutex<LivenessCheck>,
    /// Sequence number of the latest issued trigger
    sequence: AtomicU64,
    auto_trigger: AutoTrigger,
}

/// A request issued but not yet settled.
struct Pending<T> {
    seq: u64,
    merged: MergedConfig,
    request: HttpRequest,
    handle_data: Option<ResponseTransform<T>>,
    started: Instant,
}

/// One request description, its view state, and its trigger.
///
/// Cloning a handle shares the same state and sequence.
pub struct RequestHandle<T> {
    inner: Arc<HandleInner<T>>,
}

impl<T> Clone for RequestHandle<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> RequestHandle<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Replace the liveness predicate, builder style
    #[must_use]
    pub fn with_liveness(self, check: LivenessCheck) -> Self {
        self.set_liveness(check);
        self
    }

    /// Replace the liveness predicate
    pub fn set_liveness(&self, check: LivenessCheck) {
        *self
            .inner
            .liveness
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = check;
    }

    /// Current description
    #[must_use]
    pub fn description(&self) -> RequestDescription<T> {
        self.lock_description().clone()
    }

    /// Snapshot of the view state
    pub async fn view_state(&self) -> ViewState<T> {
        self.inner.store.state(Clone::clone).await
    }

    /// Read the view state via a closure
    pub async fn state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&ViewState<T>) -> R,
    {
        self.inner.store.state(f).await
    }

    /// Subscribe to applied state transitions
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<FetchAction<T>> {
        self.inner.store.subscribe_actions()
    }

    /// Run one request cycle.
    ///
    /// `extra` entries override the description's payload for this call
    /// only. A transported response is returned as `Ok` whether it was
    /// classified as success or as a logical error.
    ///
    /// # Errors
    ///
    /// - [`RequestError::Encoding`] if the payload cannot be encoded
    /// - [`RequestError::Transport`] if the HTTP client fails
    #[tracing::instrument(skip(self, extra), name = "request_trigger")]
    pub async fn trigger(&self, extra: Option<Payload>) -> Result<HttpResponse, RequestError> {
        let pending = self.begin(extra.as_ref()).await?;
        self.settle(pending).await
    }

    /// Replace the description and trigger automatically if its identity changed.
    ///
    /// Returns the spawned request when it fired. The state is already
    /// loading by the time this returns.
    pub async fn render(&self, description: RequestDescription<T>) -> Option<TriggerTask> {
        *self.lock_description() = description;
        self.observe_description().await
    }

    async fn observe_description(&self) -> Option<TriggerTask> {
        let fire = {
            let description = self.lock_description();
            self.inner.auto_trigger.observe(&*description)
        };
        if !fire {
            return None;
        }

        tracing::debug!("Request identity changed, triggering automatically");
        let begun = self.begin(None).await;
        let handle = self.clone();
        Some(tokio::spawn(async move { handle.settle(begun?).await }))
    }

    /// Merge, dispatch `Init`, and encode.
    async fn begin(&self, extra: Option<&Payload>) -> Result<Pending<T>, RequestError> {
        let (merged, handle_data) = {
            let description = self.lock_description();
            (
                self.inner.config.merge(&*description, extra),
                description.handle_data().cloned(),
            )
        };

        let seq = self.inner.sequence.fetch_add(1, Ordering::AcqRel) + 1;
        if self.is_alive() {
            self.inner.store.send(FetchAction::Init).await;
        }
        RequestMetrics::record_issued();
        let started = Instant::now();

        let encoded = match encode_params(
            &merged.url,
            merged.method,
            merged.content_type,
            merged.encode_into_url,
            &merged.config_datas,
            self.inner.config.query_encoder(),
        ) {
            Ok(encoded) => encoded,
            Err(error) => {
                tracing::warn!(%error, url = %merged.url, "Failed to encode request parameters");
                self.apply(seq, FetchAction::Error).await;
                return Err(error.into());
            },
        };

        let request = HttpRequest {
            method: merged.method,
            url: encoded.url,
            headers: merged.header_list(),
            body: encoded.body,
        };

        Ok(Pending {
            seq,
            merged,
            request,
            handle_data,
            started,
        })
    }

    /// Await the client and classify the outcome.
    async fn settle(&self, pending: Pending<T>) -> Result<HttpResponse, RequestError> {
        let Pending {
            seq,
            merged,
            request,
            handle_data,
            started,
        } = pending;

        tracing::debug!(method = %request.method, url = %request.url, seq, "Issuing request");

        match self.inner.client.execute(request).await {
            Ok(response) => {
                let outcome = if self.inner.config.is_logical_error(&response) {
                    None
                } else {
                    match self.extract(handle_data.as_ref(), &response) {
                        Ok(data) => Some(data),
                        Err(error) => {
                            tracing::warn!(%error, "Response payload does not match the expected type");
                            None
                        },
                    }
                };

                if let Some(data) = outcome {
                    tracing::info!(status = response.status, seq, "Request succeeded");
                    RequestMetrics::record_success(started.elapsed());
                    self.apply(seq, FetchAction::Success(data)).await;
                } else {
                    tracing::info!(status = response.status, seq, "Request settled with a logical error");
                    RequestMetrics::record_logical_error(started.elapsed());
                    self.apply(seq, FetchAction::Error).await;
                    // A superseded settlement still reports to a live view
                    if self.is_alive() {
                        self.inner.config.notify_logical_error(&response, &merged);
                    }
                }
                Ok(response)
            },
            Err(error) => {
                tracing::warn!(%error, seq, "Request failed in transport");
                RequestMetrics::record_transport_error(started.elapsed());
                self.inner.config.notify_transport_error(&error);
                self.apply(seq, FetchAction::Error).await;
                Err(error.into())
            },
        }
    }

    fn extract(
        &self,
        handle_data: Option<&ResponseTransform<T>>,
        response: &HttpResponse,
    ) -> Result<T, serde_json::Error> {
        match handle_data {
            Some(transform) => Ok(transform(response)),
            None => serde_json::from_value(self.inner.config.format_response(response)),
        }
    }

    /// Dispatch a settlement if the guards allow it.
    async fn apply(&self, seq: u64, action: FetchAction<T>) {
        let latest = self.inner.sequence.load(Ordering::Acquire);
        if latest != seq {
            tracing::warn!(seq, latest, "Discarding settlement superseded by a newer trigger");
            RequestMetrics::record_discarded();
            return;
        }
        if !self.is_alive() {
            tracing::warn!(seq, "Discarding settlement for a view that is no longer alive");
            RequestMetrics::record_discarded();
            return;
        }

        self.inner.store.send(action).await;
    }

    fn is_alive(&self) -> bool {
        let check = Arc::clone(
            &*self
                .inner
                .liveness
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner),
        );
        check()
    }

    fn lock_description(&self) -> MutexGuard<'_, RequestDescription<T>> {
        self.inner
            .description
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composable_request_core::TransportError;
    use composable_request_testing::MockHttpClient;
    use serde_json::{Value, json};

    fn controller(client: &Arc<MockHttpClient>) -> RequestController {
        RequestController::with_client(Arc::clone(client) as Arc<dyn HttpClient>)
    }

    #[tokio::test]
    async fn test_request_starts_idle() {
        let client = Arc::new(MockHttpClient::new());
        let handle = controller(&client).request::<Value>(RequestDescription::new("/x"));

        assert!(handle.view_state().await.is_idle());
        assert_eq!(client.request_count(), 0);
    }

    #[tokio::test]
    async fn test_superseded_settlement_is_discarded() {
        let client = Arc::new(MockHttpClient::new());
        let first = client.enqueue_deferred();
        client.enqueue_ok(json!({"code": 0, "n": 2}));

        let handle = controller(&client)
            .request::<Value>(RequestDescription::new("/x").with_trigger(false));

        let slow = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.trigger(None).await })
        };
        tokio::task::yield_now().await;
        while client.request_count() < 1 {
            tokio::task::yield_now().await;
        }

        handle.trigger(None).await.unwrap();
        first.resolve(Ok(HttpResponse::ok(json!({"code": 0, "n": 1}))));
        let response = slow.await.unwrap().unwrap();

        assert_eq!(response.body["n"], 1);
        let state = handle.view_state().await;
        assert_eq!(state.data, Some(json!({"code": 0, "n": 2})));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_encoding_failure_settles_as_error() {
        struct Refuse;
        impl composable_request_core::QueryEncoder for Refuse {
            fn encode(
                &self,
                _: &Payload,
            ) -> Result<String, composable_request_core::EncodingError> {
                Err(composable_request_core::EncodingError::Unsupported(
                    "refused".into(),
                ))
            }
        }

        let client = Arc::new(MockHttpClient::new());
        let controller = RequestController::new(
            Arc::clone(&client) as Arc<dyn HttpClient>,
            GlobalConfig::new().with_query_encoder(Refuse),
        );
        let handle = controller.request::<Value>(RequestDescription::new("/x").with_data("q", 1));

        let result = handle.trigger(None).await;

        assert!(matches!(result, Err(RequestError::Encoding(_))));
        assert_eq!(client.request_count(), 0);
        let state = handle.view_state().await;
        assert!(state.error);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_transport_error_is_returned() {
        let client = Arc::new(MockHttpClient::new());
        client.enqueue_error(TransportError::RequestFailed("reset".into()));
        let handle = controller(&client).request::<Value>(RequestDescription::new("/x"));

        let error = handle.trigger(None).await.unwrap_err();

        assert_eq!(
            error.as_transport(),
            Some(&TransportError::RequestFailed("reset".into()))
        );
    }
}
