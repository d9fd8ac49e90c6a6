//! One-Shot Initialization Gate
//!
//! Defers a side effect until after the first committed render pass of a
//! screen instance, and runs it at most once for that instance.
//!
//! Two checks guard the action, both made under the same lock right before
//! it runs:
//!
//! - **mounted**: a disposed (or dropped) screen never runs its action. The
//!   queued callback only holds a weak reference, so a dropped gate turns the
//!   callback into a no-op.
//! - **latch**: `NotFired → Fired` happens once. Later callbacks, from extra
//!   render passes or repeated [`InitGate::run_once`] calls, see `Fired` and
//!   do nothing.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::frame::FrameScheduler;
use crate::orchestrator::ScreenId;

/// Whether the gate's action has run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InitState {
    /// Waiting for the first committed frame
    NotFired,
    /// The action ran; there is no way back
    Fired,
}

#[derive(Debug)]
struct GateInner {
    state: InitState,
    mounted: bool,
}

/// Per-screen one-shot gate bound to a frame scheduler
#[derive(Debug)]
pub struct InitGate {
    screen: ScreenId,
    scheduler: FrameScheduler,
    inner: Arc<Mutex<GateInner>>,
}

impl InitGate {
    /// Create a gate for a mounted screen instance
    #[must_use]
    pub fn new(screen: ScreenId, scheduler: FrameScheduler) -> Self {
        Self {
            screen,
            scheduler,
            inner: Arc::new(Mutex::new(GateInner {
                state: InitState::NotFired,
                mounted: true,
            })),
        }
    }

    /// Schedule `action` to run after the next committed frame, once
    ///
    /// Returns `false` without scheduling anything if the gate already fired
    /// or the screen is no longer mounted.
    pub fn run_once<F>(&self, action: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        {
            let inner = self.inner.lock();
            if inner.state == InitState::Fired || !inner.mounted {
                return false;
            }
        }

        let weak = Arc::downgrade(&self.inner);
        let screen = self.screen.clone();
        self.scheduler
            .add_post_frame_callback(move || fire(&weak, &screen, action));
        true
    }

    /// Current latch state
    #[must_use]
    pub fn state(&self) -> InitState {
        self.inner.lock().state
    }

    /// Whether the screen instance is still mounted
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.lock().mounted
    }

    /// Tear the gate down; pending actions will not run
    pub fn dispose(&self) {
        let mut inner = self.inner.lock();
        if inner.mounted {
            debug!(screen = %self.screen, "Init gate disposed");
        }
        inner.mounted = false;
    }
}

fn fire<F: FnOnce()>(weak: &Weak<Mutex<GateInner>>, screen: &ScreenId, action: F) {
    let Some(inner) = weak.upgrade() else {
        debug!(screen = %screen, "Init gate dropped before first frame");
        return;
    };

    {
        let mut inner = inner.lock();
        if !inner.mounted {
            warn!(screen = %screen, "Suppressed deferred init on unmounted screen");
            return;
        }
        if inner.state == InitState::Fired {
            return;
        }
        inner.state = InitState::Fired;
    }

    debug!(screen = %screen, "Init gate fired");
    action();
}
