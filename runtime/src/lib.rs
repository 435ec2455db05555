//! # Composable Request Runtime
//!
//! Runtime for the request controller.
//!
//! This crate wires the pure pieces of `composable-request-core` to an
//! injected `HttpClient`: it owns the view state, issues requests, and
//! applies settlements only when the hosting view is still alive.
//!
//! ## Core Components
//!
//! - **Store**: Holds state behind a lock, applies a reducer, broadcasts actions
//! - **`RequestController`**: Factory sharing a client and global hooks
//! - **`RequestHandle`**: One request's view state plus its `trigger`
//! - **Liveness**: Host-supplied predicate checked before each settlement
//! - **`AutoTrigger`**: Fires once per change of `(url, payload)` identity
//!
//! ## Example
//!
//! ```ignore
//! use composable_request_runtime::RequestController;
//! use composable_request_core::{GlobalConfig, RequestDescription};
//!
//! let controller = RequestController::new(client, GlobalConfig::new());
//! let handle = controller.request::<serde_json::Value>(
//!     RequestDescription::new("/api/users").with_data("page", 1).with_trigger(false),
//! );
//!
//! let response = handle.trigger(None).await?;
//! let state = handle.view_state().await;
//! ```

use composable_request_core::reducer::Reducer;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Automatic triggering on description identity change
pub mod auto_trigger;

/// Request controller and per-request handles
pub mod controller;

/// Liveness predicates supplied by the hosting view
pub mod liveness;

/// Prometheus metrics for observability
pub mod metrics;

/// Store module - The runtime for reducers
///
/// A Store owns one piece of state and serializes every reducer call
/// through a write lock, so dispatched actions are applied one at a time.
pub mod store {
    use super::{Arc, Reducer, RwLock};
    use tokio::sync::broadcast;

    /// Capacity of the action broadcast channel
    const ACTION_BROADCAST_CAPACITY: usize = 16;

    /// The Store - runtime coordinator for a reducer
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `R`: Reducer implementation
    ///
    /// # Example
    ///
    /// ```
    /// use composable_request_core::{FetchAction, FetchReducer, ViewState};
    /// use composable_request_runtime::Store;
    ///
    /// # async fn example() {
    /// let store = Store::new(ViewState::<u8>::default(), FetchReducer::new());
    /// store.send(FetchAction::Init).await;
    /// assert!(store.state(|s| s.loading).await);
    /// # }
    /// ```
    pub struct Store<S, A, R>
    where
        R: Reducer<State = S, Action = A>,
    {
        state: Arc<RwLock<S>>,
        reducer: Arc<R>,
        /// Every applied action is broadcast so views can re-render on change.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, R> Store<S, A, R>
    where
        R: Reducer<State = S, Action = A> + Send + Sync + 'static,
        A: Send + Clone + 'static,
        S: Send + Sync + 'static,
    {
        /// Create a new store with initial state and reducer
        #[must_use]
        pub fn new(initial_state: S, reducer: R) -> Self {
            let (action_broadcast, _) = broadcast::channel(ACTION_BROADCAST_CAPACITY);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer: Arc::new(reducer),
                action_broadcast,
            }
        }

        /// Send an action to the store
        ///
        /// The reducer runs while holding the write lock. Once the state is
        /// updated, the action is broadcast to subscribers; a subscriber that
        /// reads state after receiving an action sees its effect.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) {
            {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                let start = std::time::Instant::now();
                self.reducer.reduce(&mut *state, action.clone());
                crate::metrics::ReducerMetrics::record_action(start.elapsed());
            }

            // No subscribers is fine
            let _ = self.action_broadcast.send(action);
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let loading = store.state(|s| s.loading).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Subscribe to applied actions
        ///
        /// Receivers only see actions sent after subscribing. A slow receiver
        /// may observe `RecvError::Lagged` and should re-read state.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }
    }

    impl<S, A, R> Clone for Store<S, A, R>
    where
        R: Reducer<State = S, Action = A>,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: Arc::clone(&self.reducer),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use auto_trigger::{AutoTrigger, TriggerIdentity};
pub use controller::{RequestController, RequestHandle};
pub use liveness::{LivenessCheck, MountState, always_alive};
pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use composable_request_core::{FetchAction, FetchReducer, ViewState};

    #[tokio::test]
    async fn test_store_applies_actions_in_order() {
        let store = Store::new(ViewState::<i32>::default(), FetchReducer::new());

        store.send(FetchAction::Init).await;
        store.send(FetchAction::Success(3)).await;
        store.send(FetchAction::Init).await;
        store.send(FetchAction::Error).await;

        let state = store.state(Clone::clone).await;
        assert_eq!(
            state,
            ViewState {
                data: Some(3),
                loading: false,
                error: true,
            }
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_updated_state() {
        let store = Store::new(ViewState::<i32>::default(), FetchReducer::new());
        let mut actions = store.subscribe_actions();

        store.send(FetchAction::Success(9)).await;

        let action = actions.recv().await.unwrap();
        assert_eq!(action, FetchAction::Success(9));
        assert_eq!(store.state(|s| s.data).await, Some(9));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = Store::new(ViewState::<i32>::default(), FetchReducer::new());
        let clone = store.clone();

        clone.send(FetchAction::Init).await;

        assert!(store.state(|s| s.loading).await);
    }
}
