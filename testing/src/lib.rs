//! # Composable Request Testing
//!
//! Testing utilities for the request controller.
//!
//! This crate provides:
//! - [`MockHttpClient`]: an `HttpClient` that replays scripted responses and records requests
//! - [`HookRecorder`]: captures global hook invocations
//! - [`ReducerTest`]: a Given-When-Then harness for reducers
//!
//! ## Example
//!
//! ```ignore
//! use composable_request_testing::{HookRecorder, MockHttpClient};
//!
//! #[tokio::test]
//! async fn test_logical_error() {
//!     let client = Arc::new(MockHttpClient::new());
//!     client.enqueue_ok(json!({"code": 1}));
//!     let hooks = HookRecorder::new();
//!     let controller = RequestController::new(client.clone(), hooks.install(GlobalConfig::new()));
//!
//!     let handle = controller.request::<Value>(RequestDescription::new("/x"));
//!     handle.trigger(None).await.unwrap();
//!
//!     assert_eq!(hooks.logical_errors().len(), 1);
//! }
//! ```

/// Hook invocation capture
pub mod hooks;

/// Scripted HTTP client
pub mod mocks;

/// Given-When-Then reducer harness
pub mod reducer_test;

// Re-export commonly used items
pub use hooks::HookRecorder;
pub use mocks::{DeferredResponse, MockHttpClient};
pub use reducer_test::ReducerTest;
