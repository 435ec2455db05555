//! Ergonomic testing utilities for reducers
//!
//! This module provides a fluent API for testing reducers with readable Given-When-Then syntax.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use composable_request_core::Reducer;

/// Type alias for state assertion functions
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Fluent API for testing reducers with Given-When-Then syntax
///
/// Actions are applied in the order they were given.
///
/// # Example
///
/// ```
/// use composable_request_core::{FetchAction, FetchReducer, ViewState};
/// use composable_request_testing::ReducerTest;
///
/// ReducerTest::new(FetchReducer::<u32>::new())
///     .given_state(ViewState::default())
///     .when_action(FetchAction::Init)
///     .when_action(FetchAction::Success(7))
///     .then_state(|state| {
///         assert_eq!(state.data, Some(7));
///         assert!(!state.loading);
///     })
///     .run();
/// ```
pub struct ReducerTest<R, S, A>
where
    R: Reducer<State = S, Action = A>,
{
    reducer: R,
    initial_state: Option<S>,
    actions: Vec<A>,
    state_assertions: Vec<StateAssertion<S>>,
}

impl<R, S, A> ReducerTest<R, S, A>
where
    R: Reducer<State = S, Action = A>,
{
    /// Create a new reducer test with the given reducer
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            initial_state: None,
            actions: Vec::new(),
            state_assertions: Vec::new(),
        }
    }

    /// Set the initial state (Given)
    #[must_use]
    pub fn given_state(mut self, state: S) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Add an action to apply (When)
    #[must_use]
    pub fn when_action(mut self, action: A) -> Self {
        self.actions.push(action);
        self
    }

    /// Add several actions to apply in order (When)
    #[must_use]
    pub fn when_actions(mut self, actions: impl IntoIterator<Item = A>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Add an assertion about the resulting state (Then)
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&S) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions
    ///
    /// # Panics
    ///
    /// Panics if initial state or actions are not set,
    /// or if any assertions fail.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        assert!(
            !self.actions.is_empty(),
            "At least one action must be set with when_action()"
        );

        for action in self.actions {
            self.reducer.reduce(&mut state, action);
        }

        for assertion in self.state_assertions {
            assertion(&state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use composable_request_core::{FetchAction, FetchReducer, ViewState};

    #[test]
    fn test_init_keeps_previous_data() {
        ReducerTest::new(FetchReducer::new())
            .given_state(ViewState {
                data: Some("old"),
                loading: false,
                error: true,
            })
            .when_action(FetchAction::Init)
            .then_state(|state| {
                assert_eq!(state.data, Some("old"));
                assert!(state.loading);
                assert!(!state.error);
            })
            .run();
    }

    #[test]
    fn test_error_after_success_keeps_data() {
        ReducerTest::new(FetchReducer::new())
            .given_state(ViewState::default())
            .when_actions([
                FetchAction::Init,
                FetchAction::Success(1),
                FetchAction::Init,
                FetchAction::Error,
                FetchAction::Error,
            ])
            .then_state(|state| {
                assert_eq!(state.data, Some(1));
                assert!(!state.loading);
                assert!(state.error);
            })
            .run();
    }

    #[test]
    #[should_panic(expected = "given_state")]
    fn test_missing_state_panics() {
        ReducerTest::new(FetchReducer::<u8>::new())
            .when_action(FetchAction::Init)
            .run();
    }
}
