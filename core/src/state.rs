//! View state and the fetch reducer.
//!
//! `ViewState` is the record a UI reads. It only changes through
//! [`FetchReducer`], which handles exactly three actions:
//!
//! | Action | `loading` | `error` | `data` |
//! |---|---|---|---|
//! | `Init` | `true` | `false` | unchanged |
//! | `Success(x)` | `false` | `false` | `Some(x)` |
//! | `Error` | `false` | `true` | unchanged |

use crate::reducer::Reducer;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// Reactive state for one request handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState<T> {
    /// Payload of the last successful settlement
    pub data: Option<T>,

    /// A request has been issued and has not settled yet
    pub loading: bool,

    /// The last settlement was a logical or transport error
    pub error: bool,
}

impl<T> ViewState<T> {
    /// Create the idle state: no data, not loading, no error
    #[must_use]
    pub const fn new() -> Self {
        Self {
            data: None,
            loading: false,
            error: false,
        }
    }

    /// Nothing has been issued yet
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        !self.loading && !self.error && self.data.is_none()
    }
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Actions accepted by [`FetchReducer`].
///
/// The enum is closed, so an unrecognized action cannot reach the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAction<T> {
    /// A request was issued
    Init,

    /// A request settled successfully with the extracted payload
    Success(T),

    /// A request settled with a logical or transport error
    Error,
}

/// The reducer behind every request handle.
#[derive(Debug, Clone, Copy)]
pub struct FetchReducer<T> {
    _phantom: PhantomData<fn() -> T>,
}

impl<T> FetchReducer<T> {
    /// Create a new fetch reducer
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }
}

impl<T> Default for FetchReducer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Reducer for FetchReducer<T> {
    type State = ViewState<T>;
    type Action = FetchAction<T>;

    fn reduce(&self, state: &mut Self::State, action: Self::Action) {
        match action {
            FetchAction::Init => {
                state.loading = true;
                state.error = false;
            },
            FetchAction::Success(payload) => {
                state.loading = false;
                state.error = false;
                state.data = Some(payload);
            },
            FetchAction::Error => {
                state.loading = false;
                state.error = true;
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reduce_all(state: ViewState<i32>, actions: Vec<FetchAction<i32>>) -> ViewState<i32> {
        let reducer = FetchReducer::new();
        let mut state = state;
        for action in actions {
            reducer.reduce(&mut state, action);
        }
        state
    }

    #[test]
    fn test_initial_state_is_idle() {
        let state = ViewState::<i32>::default();
        assert!(state.is_idle());
        assert_eq!(state.data, None);
    }

    #[test]
    fn test_init_keeps_data() {
        let state = ViewState {
            data: Some(3),
            loading: false,
            error: true,
        };
        let state = reduce_all(state, vec![FetchAction::Init]);
        assert!(state.loading);
        assert!(!state.error);
        assert_eq!(state.data, Some(3));
    }

    #[test]
    fn test_init_then_success_overwrites_data() {
        for initial in [None, Some(1), Some(99)] {
            let state = ViewState {
                data: initial,
                loading: false,
                error: true,
            };
            let state = reduce_all(state, vec![FetchAction::Init, FetchAction::Success(42)]);
            assert_eq!(
                state,
                ViewState {
                    data: Some(42),
                    loading: false,
                    error: false,
                }
            );
        }
    }

    #[test]
    fn test_repeated_error_is_idempotent() {
        let start = ViewState {
            data: Some(5),
            loading: true,
            error: false,
        };
        let once = reduce_all(start.clone(), vec![FetchAction::Error]);
        let twice = reduce_all(start, vec![FetchAction::Error, FetchAction::Error]);

        assert_eq!(once, twice);
        assert_eq!(twice.data, Some(5));
        assert!(twice.error);
        assert!(!twice.loading);
    }

    #[test]
    fn test_success_clears_previous_error() {
        let state = reduce_all(
            ViewState::default(),
            vec![
                FetchAction::Init,
                FetchAction::Error,
                FetchAction::Init,
                FetchAction::Success(1),
            ],
        );
        assert!(!state.error);
        assert_eq!(state.data, Some(1));
    }
}
