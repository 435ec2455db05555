//! Liveness predicates.
//!
//! A request may settle after the view that issued it has gone away. The
//! hosting context supplies a [`LivenessCheck`]; the controller calls it at
//! settlement time and drops the state mutation when it returns `false`.
//!
//! [`MountState`] is a ready-made predicate for hosts that track a
//! mount/unmount lifecycle by hand.
//!
//! ```
//! use composable_request_runtime::MountState;
//!
//! let mount = MountState::new();
//! let check = mount.checker();
//! assert!(check());
//!
//! mount.unmount();
//! assert!(!check());
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Returns `true` while the owning view still accepts state updates.
pub type LivenessCheck = Arc<dyn Fn() -> bool + Send + Sync>;

/// A predicate that is always alive
#[must_use]
pub fn always_alive() -> LivenessCheck {
    Arc::new(|| true)
}

/// Mount flag shared between a view and its request handles.
#[derive(Debug, Clone)]
pub struct MountState {
    mounted: Arc<AtomicBool>,
}

impl MountState {
    /// Create a mounted state
    #[must_use]
    pub fn new() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Whether the view is still mounted
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Mark the view as unmounted; later settlements are discarded
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
        tracing::debug!("View unmounted, pending settlements will be discarded");
    }

    /// Predicate reading this mount flag
    #[must_use]
    pub fn checker(&self) -> LivenessCheck {
        let mounted = Arc::clone(&self.mounted);
        Arc::new(move || mounted.load(Ordering::Acquire))
    }
}

impl Default for MountState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let mount = MountState::new();
        let clone = mount.clone();
        clone.unmount();
        assert!(!mount.is_mounted());
    }

    #[test]
    fn test_always_alive() {
        assert!(always_alive()());
    }
}
