//! Automatic triggering.
//!
//! A description with `trigger = true` fires on its own, once per change of
//! its identity. The identity is the URL plus the serialized payload, so two
//! equal payloads built on different renders count as the same request and
//! do not re-fire.
//!
//! Identity is tracked even while the trigger flag is off: flipping the flag
//! on later does not fire until the identity changes again.

use composable_request_core::RequestDescription;
use std::sync::Mutex;

/// `(url, serialized payload)` of a description.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TriggerIdentity {
    url: String,
    payload: String,
}

impl TriggerIdentity {
    /// Identity of a description
    #[must_use]
    pub fn of<T>(description: &RequestDescription<T>) -> Self {
        Self {
            url: description.url().to_string(),
            payload: description.payload_identity(),
        }
    }

    /// URL part of the identity
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Remembers the last identity seen and decides whether to fire.
#[derive(Debug, Default)]
pub struct AutoTrigger {
    last: Mutex<Option<TriggerIdentity>>,
}

impl AutoTrigger {
    /// Create a tracker that has seen nothing yet
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: Mutex::new(None),
        }
    }

    /// Record the description's identity and report whether it should fire.
    ///
    /// Fires when the identity differs from the previous observation, the
    /// trigger flag is set, and the URL is non-empty.
    pub fn observe<T>(&self, description: &RequestDescription<T>) -> bool {
        let identity = TriggerIdentity::of(description);
        let armed = description.trigger() && !identity.url().is_empty();
        let changed = {
            let mut last = self
                .last
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if last.as_ref() == Some(&identity) {
                false
            } else {
                *last = Some(identity);
                true
            }
        };

        changed && armed
    }
}
