//! Capture of global hook invocations.

use composable_request_core::{GlobalConfig, HttpResponse, MergedConfig, TransportError};
use std::sync::{Arc, Mutex, PoisonError};

/// Records every call to the logical-error and transport-error hooks.
///
/// Clones share the same recordings.
///
/// ```
/// use composable_request_core::GlobalConfig;
/// use composable_request_testing::HookRecorder;
///
/// let hooks = HookRecorder::new();
/// let config = hooks.install(GlobalConfig::new());
/// config.notify_transport_error(&composable_request_core::TransportError::RequestFailed("x".into()));
/// assert_eq!(hooks.transport_errors().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct HookRecorder {
    logical: Arc<Mutex<Vec<(HttpResponse, MergedConfig)>>>,
    transport: Arc<Mutex<Vec<TransportError>>>,
}

impl HookRecorder {
    /// Create a recorder with nothing recorded
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install both hooks into a configuration, replacing any already set
    #[must_use]
    pub fn install(&self, config: GlobalConfig) -> GlobalConfig {
        let logical = Arc::clone(&self.logical);
        let transport = Arc::clone(&self.transport);
        config
            .with_on_logical_error(move |response, merged| {
                logical
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push((response.clone(), merged.clone()));
            })
            .with_on_transport_error(move |error| {
                transport
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(error.clone());
            })
    }

    /// Logical-error hook calls, in order
    #[must_use]
    pub fn logical_errors(&self) -> Vec<(HttpResponse, MergedConfig)> {
        self.logical
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Transport-error hook calls, in order
    #[must_use]
    pub fn transport_errors(&self) -> Vec<TransportError> {
        self.transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
