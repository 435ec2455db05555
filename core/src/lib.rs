//! # Composable Request Core
//!
//! Core types for turning a declarative request description into reactive
//! view state.
//!
//! A UI component describes the request it needs (`RequestDescription`), the
//! runtime crate issues it through an injected `HttpClient`, and every
//! outcome is folded into a three-field `ViewState` by a pure reducer.
//!
//! ## Core Concepts
//!
//! - **`ViewState`**: `{ data, loading, error }`, the only state a caller reads
//! - **`FetchAction`**: `Init`, `Success(payload)`, `Error`
//! - **`FetchReducer`**: Pure function `(ViewState, FetchAction) → ViewState`
//! - **`RequestDescription`**: URL, method, headers, payload and trigger options
//! - **Parameter encoding**: method and content type decide where the payload goes
//! - **`HttpClient`**: The transport collaborator, injected as a trait object
//! - **`GlobalConfig`**: Default request options plus error and formatting hooks
//!
//! ## Example
//!
//! ```
//! use composable_request_core::{FetchAction, FetchReducer, Reducer, ViewState};
//!
//! let reducer = FetchReducer::<u32>::new();
//! let mut state = ViewState::default();
//!
//! reducer.reduce(&mut state, FetchAction::Init);
//! assert!(state.loading);
//!
//! reducer.reduce(&mut state, FetchAction::Success(7));
//! assert_eq!(state.data, Some(7));
//! assert!(!state.loading);
//! ```

pub mod config;
pub mod encoding;
pub mod error;
pub mod http;
pub mod request;
pub mod state;

/// Reducer module - The core trait for state transitions
///
/// Reducers are pure functions: `(State, Action) → State`. They are
/// deterministic and contain no I/O; the runtime decides when to call them.
pub mod reducer {
    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    ///
    /// # Example
    ///
    /// ```
    /// use composable_request_core::Reducer;
    ///
    /// struct Counter;
    ///
    /// impl Reducer for Counter {
    ///     type State = i64;
    ///     type Action = i64;
    ///
    ///     fn reduce(&self, state: &mut i64, action: i64) {
    ///         *state += action;
    ///     }
    /// }
    ///
    /// let mut total = 0;
    /// Counter.reduce(&mut total, 5);
    /// assert_eq!(total, 5);
    /// ```
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// Apply an action to the state in place
        fn reduce(&self, state: &mut Self::State, action: Self::Action);
    }
}

// Re-export commonly used types
pub use config::{GlobalConfig, MergedConfig, RequestOptions, default_classify_error};
pub use encoding::{EncodedRequest, QsEncoder, QueryEncoder, append_query, encode_params};
pub use error::{EncodingError, RequestError, TransportError};
pub use http::{HttpClient, HttpRequest, HttpResponse, RequestBody};
pub use reducer::Reducer;
pub use request::{ContentType, HttpMethod, Payload, RequestDescription, ResponseTransform};
pub use state::{FetchAction, FetchReducer, ViewState};
