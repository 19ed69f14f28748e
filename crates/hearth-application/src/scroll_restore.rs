//! Scroll-restore coordinator.
//!
//! Persists the viewport offset while a session is active and replays it
//! once after authentication. The replay waits for the rendering side to
//! report that its surface is mounted instead of guessing with a delay.

use std::sync::{Arc, Mutex, MutexGuard};

use hearth_core::keys::durable;

use crate::dual_store::DualStore;

/// Something that can be scrolled to an absolute offset.
pub trait Viewport {
    fn jump_to(&mut self, offset: u32);
}

#[derive(Debug, Default)]
struct ReplayState {
    /// Offset armed by the last authentication, consumed by one replay.
    pending: Option<u32>,
    mounted: bool,
}

pub struct ScrollRestore {
    stores: Arc<DualStore>,
    state: Mutex<ReplayState>,
}

impl ScrollRestore {
    pub fn new(stores: Arc<DualStore>) -> Self {
        Self {
            stores,
            state: Mutex::new(ReplayState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ReplayState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// The persisted offset, or 0.
    pub fn saved_offset(&self) -> u32 {
        match self.stores.durable().read(durable::SCROLL_POSITION) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or(0),
            Ok(None) => 0,
            Err(e) => {
                tracing::warn!("[Scroll] Could not read saved offset: {}", e);
                0
            }
        }
    }

    /// Persists a scroll event. Ignored while anonymous.
    pub fn record_scroll(&self, offset: u32, authenticated: bool) {
        if !authenticated {
            return;
        }
        if let Err(e) = self
            .stores
            .durable()
            .write(durable::SCROLL_POSITION, &offset.to_string(), None)
        {
            tracing::warn!("[Scroll] Could not persist offset {}: {}", offset, e);
        }
    }

    /// Arms a single replay of the persisted offset.
    pub fn on_authenticated(&self) {
        let offset = self.saved_offset();
        self.lock().pending = Some(offset);
        tracing::debug!("[Scroll] Armed replay to {}", offset);
    }

    /// Readiness signal from the renderer. Replays an armed offset, if any.
    ///
    /// Returns whether a jump was made.
    pub fn surface_ready(&self, viewport: &mut dyn Viewport) -> bool {
        let pending = {
            let mut state = self.lock();
            state.mounted = true;
            state.pending.take()
        };
        Self::jump(viewport, pending)
    }

    /// Replays an armed offset if the surface is already mounted.
    pub fn replay_pending(&self, viewport: &mut dyn Viewport) -> bool {
        let pending = {
            let mut state = self.lock();
            if !state.mounted {
                return false;
            }
            state.pending.take()
        };
        Self::jump(viewport, pending)
    }

    pub fn surface_unmounted(&self) {
        self.lock().mounted = false;
    }

    pub fn has_pending_replay(&self) -> bool {
        self.lock().pending.is_some()
    }

    /// Drops any armed replay and forgets the persisted offset.
    pub fn on_logout(&self) {
        self.lock().pending = None;
        if let Err(e) = self.stores.durable().remove(durable::SCROLL_POSITION) {
            tracing::warn!("[Scroll] Could not clear saved offset: {}", e);
        }
    }

    fn jump(viewport: &mut dyn Viewport, pending: Option<u32>) -> bool {
        match pending {
            Some(offset) => {
                tracing::debug!("[Scroll] Restoring offset {}", offset);
                viewport.jump_to(offset);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::clock::ManualClock;

    #[derive(Default)]
    struct RecordingViewport {
        jumps: Vec<u32>,
    }

    impl Viewport for RecordingViewport {
        fn jump_to(&mut self, offset: u32) {
            self.jumps.push(offset);
        }
    }

    fn coordinator() -> ScrollRestore {
        ScrollRestore::new(Arc::new(DualStore::in_memory(Arc::new(ManualClock::default()))))
    }

    #[test]
    fn test_anonymous_scroll_is_ignored() {
        let scroll = coordinator();
        scroll.record_scroll(300, false);
        assert_eq!(scroll.saved_offset(), 0);

        scroll.record_scroll(300, true);
        scroll.record_scroll(310, true);
        assert_eq!(scroll.saved_offset(), 310);
    }

    #[test]
    fn test_replay_happens_once_on_ready() {
        let scroll = coordinator();
        scroll.record_scroll(450, true);
        scroll.on_authenticated();

        let mut viewport = RecordingViewport::default();
        assert!(scroll.surface_ready(&mut viewport));
        assert!(!scroll.surface_ready(&mut viewport));
        assert_eq!(viewport.jumps, vec![450]);
    }

    #[test]
    fn test_replay_on_mounted_surface() {
        let scroll = coordinator();
        let mut viewport = RecordingViewport::default();
        assert!(!scroll.surface_ready(&mut viewport));

        scroll.record_scroll(80, true);
        scroll.on_authenticated();
        assert!(scroll.replay_pending(&mut viewport));
        assert_eq!(viewport.jumps, vec![80]);
    }

    #[test]
    fn test_unmounted_surface_waits() {
        let scroll = coordinator();
        let mut viewport = RecordingViewport::default();
        scroll.surface_ready(&mut viewport);
        scroll.surface_unmounted();

        scroll.on_authenticated();
        assert!(!scroll.replay_pending(&mut viewport));
        assert!(scroll.has_pending_replay());
        assert!(scroll.surface_ready(&mut viewport));
        assert_eq!(viewport.jumps, vec![0]);
    }

    #[test]
    fn test_logout_disarms_and_clears() {
        let scroll = coordinator();
        scroll.record_scroll(450, true);
        scroll.on_authenticated();
        scroll.on_logout();

        assert!(!scroll.has_pending_replay());
        assert_eq!(scroll.saved_offset(), 0);
    }
}
