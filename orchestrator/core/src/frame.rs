//! Frame Lifecycle
//!
//! A minimal model of the rendering pipeline's frame lifecycle: callbacks can
//! be queued to run after the current render pass commits. The surface calls
//! [`FrameScheduler::commit_frame`] once layout and paint for a pass are done.
//!
//! Callbacks queued while a commit is draining run on the next commit, never
//! in the same pass. Everything runs on the caller's thread; the lock only
//! makes the handle shareable.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{trace, warn};

type PostFrameCallback = Box<dyn FnOnce() + Send + 'static>;

#[derive(Default)]
struct SchedulerInner {
    pending: Vec<PostFrameCallback>,
    committed: u64,
}

/// Shared handle to the post-frame callback queue
#[derive(Clone, Default)]
pub struct FrameScheduler {
    inner: Arc<Mutex<SchedulerInner>>,
}

impl std::fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("FrameScheduler")
            .field("pending", &inner.pending.len())
            .field("committed", &inner.committed)
            .finish()
    }
}

impl FrameScheduler {
    /// Create an empty scheduler
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `callback` after the next committed render pass
    pub fn add_post_frame_callback<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.inner.lock().pending.push(Box::new(callback));
    }

    /// Mark the current render pass as committed and run queued callbacks
    ///
    /// Returns the number of callbacks that ran.
    ///
    /// A panicking callback does not stop the others: every callback queued
    /// before the commit runs, then the first panic is resumed.
    pub fn commit_frame(&self) -> usize {
        let callbacks = {
            let mut inner = self.inner.lock();
            inner.committed += 1;
            std::mem::take(&mut inner.pending)
        };
        let ran = callbacks.len();
        trace!(callbacks = ran, "Frame committed");

        // Run outside the lock so callbacks may queue work for the next frame.
        let mut first_panic = None;
        for callback in callbacks {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(callback)) {
                warn!("Post-frame callback panicked");
                first_panic.get_or_insert(payload);
            }
        }
        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
        ran
    }

    /// Number of callbacks waiting for the next commit
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Number of committed render passes so far
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.inner.lock().committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_callbacks_wait_for_commit() {
        let scheduler = FrameScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        scheduler.add_post_frame_callback(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.pending(), 1);

        assert_eq!(scheduler.commit_frame(), 1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_callbacks_run_once() {
        let scheduler = FrameScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        scheduler.add_post_frame_callback(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.commit_frame();
        scheduler.commit_frame();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.frame_count(), 2);
    }

    #[test]
    fn test_callback_queued_during_commit_runs_next_frame() {
        let scheduler = FrameScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let inner_scheduler = scheduler.clone();
        let h = Arc::clone(&hits);
        scheduler.add_post_frame_callback(move || {
            inner_scheduler.add_post_frame_callback(move || {
                h.fetch_add(1, Ordering::SeqCst);
            });
        });

        scheduler.commit_frame();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        scheduler.commit_frame();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_callback_does_not_drop_the_rest() {
        let scheduler = FrameScheduler::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        scheduler.add_post_frame_callback(|| panic!("engine unavailable"));
        scheduler.add_post_frame_callback(move || {
            h.fetch_add(1, Ordering::SeqCst);
        });

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| scheduler.commit_frame()));

        assert!(outcome.is_err(), "the panic is still reported to the caller");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.commit_frame(), 0);
    }
}
