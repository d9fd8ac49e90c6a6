//! Render Fault Capture
//!
//! Keeps one failing render pass from taking the whole session down.
//!
//! # Pieces
//!
//! - [`ErrorCapture`]: the process-wide panic hook. Installed once through
//!   [`ErrorCapture::install`]; later installs return the existing instance.
//!   The hook records fault details for the boundary currently rendering on
//!   this thread and forwards them to the optional [`FaultObserver`].
//! - [`ErrorBoundary`]: a per-screen fault boundary. Its [`ErrorState`] is
//!   `Healthy` or `Faulted(details)`, kept behind one lock so readers never
//!   see a faulted flag without its details.
//!
//! # Flow
//!
//! ```text
//! render(subtree) ──▶ Healthy? ──no──▶ Fallback(details)
//!                        │
//!                       yes
//!                        ▼
//!             catch_unwind(subtree)
//!              │         │        │
//!            Ok(v)    Err(e)    panic ──▶ hook stashes details ─┐
//!              │         │                                      │
//!          Content(v)    └──────────▶ Faulted(details) ◀────────┘
//!                                            │
//!                                      reset() (user)
//!                                            ▼
//!                                         Healthy
//! ```
//!
//! Reset only clears the local state. Nothing is retried.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

static CAPTURE: OnceLock<ErrorCapture> = OnceLock::new();

thread_local! {
    static BOUNDARY_DEPTH: Cell<usize> = const { Cell::new(0) };
    static LAST_FAULT: RefCell<Option<FaultDetails>> = const { RefCell::new(None) };
}

// ============================================================================
// Fault Details
// ============================================================================

/// What went wrong during a render pass
///
/// Both fields are opaque to this layer; they are only displayed or logged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultDetails {
    /// Error description
    pub message: String,
    /// Stack trace, empty when capture is disabled
    pub stack: String,
    /// When the fault was captured
    pub captured_at: DateTime<Utc>,
}

impl FaultDetails {
    /// Details captured now
    #[must_use]
    pub fn new(message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: stack.into(),
            captured_at: Utc::now(),
        }
    }

    /// Details for an error returned from a render closure
    ///
    /// The stack is left empty when the installed [`ErrorCapture`] has
    /// backtrace capture turned off.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        let capture_backtrace = match ErrorCapture::global() {
            Some(capture) => capture.config.capture_backtrace,
            None => true,
        };
        Self::from_error_with(err, capture_backtrace)
    }

    fn from_error_with(err: &anyhow::Error, capture_backtrace: bool) -> Self {
        let stack = if capture_backtrace {
            err.backtrace().to_string()
        } else {
            String::new()
        };
        Self::new(format!("{err:#}"), stack)
    }

    fn from_payload(payload: &(dyn Any + Send)) -> Self {
        Self::new(payload_message(payload), String::new())
    }
}

fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "render panicked with a non-string payload".to_string()
    }
}

// ============================================================================
// Observer
// ============================================================================

/// External sink for captured faults (logging, analytics)
pub trait FaultObserver: Send + Sync {
    /// Called once per captured fault
    fn observe(&self, details: &FaultDetails);
}

/// Observer that logs faults through `tracing`
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingFaultObserver;

impl FaultObserver for TracingFaultObserver {
    fn observe(&self, details: &FaultDetails) {
        error!(
            message = %details.message,
            stack = %details.stack,
            captured_at = %details.captured_at,
            "Render fault captured"
        );
    }
}

// ============================================================================
// Process-wide Capture
// ============================================================================

/// Panic hook behaviour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Also run the hook that was installed before ours (stderr report)
    pub forward_to_previous_hook: bool,
    /// Capture a backtrace for every fault
    pub capture_backtrace: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            forward_to_previous_hook: true,
            capture_backtrace: true,
        }
    }
}

/// The installed process-wide fault hook
pub struct ErrorCapture {
    config: CaptureConfig,
    observer: Option<Arc<dyn FaultObserver>>,
}

impl std::fmt::Debug for ErrorCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorCapture")
            .field("config", &self.config)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl ErrorCapture {
    /// Install the panic hook, once per process
    ///
    /// The first call wins. Later calls are no-ops that return the instance
    /// installed first, whatever config or observer they pass.
    pub fn install(
        config: CaptureConfig,
        observer: Option<Arc<dyn FaultObserver>>,
    ) -> &'static ErrorCapture {
        let mut installed_now = false;
        let capture = CAPTURE.get_or_init(|| {
            installed_now = true;
            install_panic_hook(config);
            ErrorCapture { config, observer }
        });
        if installed_now {
            info!(config = ?capture.config, "Error capture installed");
        } else {
            debug!("Error capture already installed");
        }
        capture
    }

    /// The installed instance, if [`ErrorCapture::install`] ran
    #[must_use]
    pub fn global() -> Option<&'static ErrorCapture> {
        CAPTURE.get()
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> CaptureConfig {
        self.config
    }

    fn forward(&self, details: &FaultDetails) {
        if let Some(observer) = &self.observer {
            observer.observe(details);
        }
    }
}

fn install_panic_hook(config: CaptureConfig) {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let mut message = payload_message(info.payload());
        if let Some(location) = info.location() {
            message = format!("{message} at {location}");
        }
        let stack = if config.capture_backtrace {
            Backtrace::force_capture().to_string()
        } else {
            String::new()
        };
        let details = FaultDetails::new(message, stack);

        if BOUNDARY_DEPTH.with(Cell::get) > 0 {
            LAST_FAULT.with(|slot| *slot.borrow_mut() = Some(details.clone()));
        }
        if let Some(capture) = CAPTURE.get() {
            capture.forward(&details);
        }
        if config.forward_to_previous_hook {
            previous(info);
        }
    }));
}

fn forward_to_observer(details: &FaultDetails) {
    if let Some(capture) = CAPTURE.get() {
        capture.forward(details);
    }
}

/// Marks this thread as rendering inside a boundary
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Self {
        BOUNDARY_DEPTH.with(|d| d.set(d.get() + 1));
        LAST_FAULT.with(|slot| slot.borrow_mut().take());
        DepthGuard
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        BOUNDARY_DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

// ============================================================================
// Boundary
// ============================================================================

/// Health of a fault boundary
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ErrorState {
    /// Rendering normally
    #[default]
    Healthy,
    /// Showing the fallback view
    Faulted(FaultDetails),
}

impl ErrorState {
    /// Whether the boundary is faulted
    #[must_use]
    pub fn is_faulted(&self) -> bool {
        matches!(self, Self::Faulted(_))
    }
}

/// Outcome of rendering through a boundary
#[derive(Clone, Debug, PartialEq)]
pub enum Rendered<V> {
    /// The subtree rendered normally
    Content(V),
    /// The boundary is faulted; show the fallback with these details
    Fallback(FaultDetails),
}

impl<V> Rendered<V> {
    /// Whether the fallback is shown
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }

    /// The rendered content, if any
    pub fn content(self) -> Option<V> {
        match self {
            Self::Content(v) => Some(v),
            Self::Fallback(_) => None,
        }
    }
}

/// Fault boundary around a screen's subtree
///
/// Cloning shares the same state.
#[derive(Clone, Debug, Default)]
pub struct ErrorBoundary {
    state: Arc<Mutex<ErrorState>>,
}

impl ErrorBoundary {
    /// A healthy boundary
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent snapshot of the boundary's state
    #[must_use]
    pub fn state(&self) -> ErrorState {
        self.state.lock().clone()
    }

    /// Whether the boundary is faulted
    #[must_use]
    pub fn is_faulted(&self) -> bool {
        self.state.lock().is_faulted()
    }

    /// Render `subtree` unless faulted
    ///
    /// A panic or an error returned by `subtree` faults the boundary. While
    /// faulted the subtree is not run at all.
    pub fn render<V, F>(&self, subtree: F) -> Rendered<V>
    where
        F: FnOnce() -> anyhow::Result<V>,
    {
        if let ErrorState::Faulted(details) = &*self.state.lock() {
            return Rendered::Fallback(details.clone());
        }

        let outcome = {
            let _depth = DepthGuard::enter();
            panic::catch_unwind(AssertUnwindSafe(subtree))
        };

        match outcome {
            Ok(Ok(view)) => Rendered::Content(view),
            Ok(Err(err)) => {
                let details = FaultDetails::from_error(&err);
                forward_to_observer(&details);
                Rendered::Fallback(self.fault(details))
            }
            Err(payload) => {
                // The hook already forwarded these details to the observer.
                let details = LAST_FAULT
                    .with(|slot| slot.borrow_mut().take())
                    .unwrap_or_else(|| FaultDetails::from_payload(payload.as_ref()));
                Rendered::Fallback(self.fault(details))
            }
        }
    }

    /// Route a fault raised outside a render closure into this boundary
    pub fn report(&self, details: FaultDetails) {
        forward_to_observer(&details);
        self.fault(details);
    }

    /// User-initiated recovery; returns whether the boundary was faulted
    pub fn reset(&self) -> bool {
        let mut state = self.state.lock();
        let was_faulted = state.is_faulted();
        *state = ErrorState::Healthy;
        if was_faulted {
            info!("Fault boundary reset");
        }
        was_faulted
    }

    fn fault(&self, details: FaultDetails) -> FaultDetails {
        error!(message = %details.message, "Render fault, showing fallback");
        *self.state.lock() = ErrorState::Faulted(details.clone());
        details
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::RecordingObserver;
    use pretty_assertions::assert_eq;

    fn install_for_tests() -> Arc<RecordingObserver> {
        static OBSERVER: OnceLock<Arc<RecordingObserver>> = OnceLock::new();
        let observer = OBSERVER.get_or_init(|| Arc::new(RecordingObserver::default()));
        let shared: Arc<dyn FaultObserver> = observer.clone();
        ErrorCapture::install(CaptureConfig::default(), Some(shared));
        Arc::clone(observer)
    }

    // ========================================================================
    // ErrorCapture Tests
    // ========================================================================

    #[test]
    fn test_install_is_idempotent() {
        install_for_tests();
        let first = ErrorCapture::global().unwrap();
        let second = ErrorCapture::install(
            CaptureConfig {
                forward_to_previous_hook: false,
                capture_backtrace: false,
            },
            None,
        );
        assert!(std::ptr::eq(first, second));
        assert_eq!(second.config(), CaptureConfig::default());
    }

    // ========================================================================
    // ErrorBoundary Tests
    // ========================================================================

    #[test]
    fn test_healthy_boundary_renders_content() {
        let boundary = ErrorBoundary::new();
        let rendered = boundary.render(|| Ok("screen"));
        assert_eq!(rendered, Rendered::Content("screen"));
        assert_eq!(boundary.state(), ErrorState::Healthy);
    }

    #[test]
    fn test_panic_faults_boundary_with_hook_details() {
        let observer = install_for_tests();
        let boundary = ErrorBoundary::new();

        let rendered: Rendered<()> = boundary.render(|| panic!("avatar sprite missing: 7f3a"));

        let ErrorState::Faulted(details) = boundary.state() else {
            panic!("boundary should be faulted");
        };
        assert!(details.message.contains("avatar sprite missing: 7f3a"));
        // The hook adds the panic location.
        assert!(details.message.contains("fault.rs"));
        assert!(rendered.is_fallback());
        assert!(observer.contains("avatar sprite missing: 7f3a"));
    }

    #[test]
    fn test_returned_error_faults_boundary_and_reaches_observer() {
        let observer = install_for_tests();
        let boundary = ErrorBoundary::new();

        let rendered: Rendered<()> =
            boundary.render(|| Err(anyhow::anyhow!("layout overflow b21c")));

        assert!(rendered.is_fallback());
        assert!(boundary.is_faulted());
        assert!(observer.contains("layout overflow b21c"));
    }

    #[test]
    fn test_faulted_boundary_skips_subtree() {
        let boundary = ErrorBoundary::new();
        boundary.report(FaultDetails::new("boom", ""));

        let mut ran = false;
        let rendered = boundary.render(|| {
            ran = true;
            Ok(())
        });

        assert!(!ran);
        match rendered {
            Rendered::Fallback(details) => assert_eq!(details.message, "boom"),
            Rendered::Content(()) => panic!("expected fallback"),
        }
    }

    #[test]
    fn test_reset_restores_rendering() {
        let boundary = ErrorBoundary::new();
        let _ = boundary.render::<(), _>(|| Err(anyhow::anyhow!("transient")));
        assert!(boundary.is_faulted());

        assert!(boundary.reset());
        assert_eq!(boundary.state(), ErrorState::Healthy);
        assert_eq!(boundary.render(|| Ok(1)).content(), Some(1));
        assert!(!boundary.reset());
    }

    #[test]
    fn test_nearest_boundary_captures() {
        install_for_tests();
        let outer = ErrorBoundary::new();
        let inner = ErrorBoundary::new();

        let rendered = outer.render(|| {
            let inner_result: Rendered<()> = inner.render(|| panic!("inner only"));
            Ok(inner_result.is_fallback())
        });

        assert_eq!(rendered, Rendered::Content(true));
        assert!(inner.is_faulted());
        assert!(!outer.is_faulted());
    }

    #[test]
    fn test_boundary_without_installed_hook_uses_payload() {
        // Whether or not another test installed the hook, the message survives.
        let boundary = ErrorBoundary::new();
        let _ = boundary.render::<(), _>(|| std::panic::panic_any(String::from("owned payload")));
        let ErrorState::Faulted(details) = boundary.state() else {
            panic!("boundary should be faulted");
        };
        assert!(details.message.contains("owned payload"));
    }

    #[test]
    fn test_error_details_skip_backtrace_when_disabled() {
        let err = anyhow::anyhow!("tile cache miss").context("rendering chat pane");

        let details = FaultDetails::from_error_with(&err, false);

        assert_eq!(details.stack, "");
        assert_eq!(details.message, "rendering chat pane: tile cache miss");
    }

    #[test]
    fn test_clones_share_state() {
        let boundary = ErrorBoundary::new();
        let surface_view = boundary.clone();
        boundary.report(FaultDetails::new("shared", ""));
        assert!(surface_view.is_faulted());
        surface_view.reset();
        assert!(!boundary.is_faulted());
    }
}
