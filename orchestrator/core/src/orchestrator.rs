//! Conversation Orchestrator
//!
//! Drives one screen instance. It ties together the pieces in this crate:
//!
//! ```text
//!   NavigationContext ──▶ entry::resolve ──▶ InitGate (after 1st frame) ──▶ engine
//!   engine snapshots  ──▶ emotion::to_display ──────────────────────────▶ renderer
//!   layout width      ──▶ BreakpointSet::classify ──────────────────────▶ renderer
//!   user actions      ──────────────────────────────────────────────────▶ engine
//! ```
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──mount()──▶ Initializing ──first frame──▶ Active
//!        │                        │                          │
//!        └────────────────────────┴──────dispose()───────────┴──▶ Disposed
//! ```
//!
//! `Faulted` is reported by [`ConversationOrchestrator::status`] whenever the
//! screen's fault boundary is faulted, whatever the lifecycle phase. Resetting
//! the boundary goes back to the phase underneath (normally `Active`) and never
//! re-runs the entry dispatch.
//!
//! Dispatch is fire-and-forget: the screen becomes `Active` once the engine
//! call is issued, not when the engine answers.

use std::fmt;
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::config::OrchestratorConfig;
use crate::emotion;
use crate::engine::{ConversationEngine, EngineSnapshot};
use crate::entry::{self, EntryMode};
use crate::fault::{ErrorBoundary, ErrorState, Rendered};
use crate::frame::FrameScheduler;
use crate::frameworks;
use crate::init_gate::{InitGate, InitState};
use crate::layout::{self, BreakpointSet, LayoutClass, LayoutVariants};
use crate::navigation::NavigationContext;
use crate::rendering::RenderingCollaborator;

/// Screen instance identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScreenId(pub String);

impl ScreenId {
    /// Generate a new unique screen ID
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ScreenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle phase of a screen instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenPhase {
    /// Constructed, not yet mounted
    Uninitialized,
    /// Mounted, entry dispatch waiting for the first frame
    Initializing,
    /// Entry dispatch issued
    Active,
    /// Torn down
    Disposed,
}

/// Externally visible status: the phase, overridden by a fault
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenStatus {
    /// Constructed, not yet mounted
    Uninitialized,
    /// Waiting for the first frame
    Initializing,
    /// Running normally
    Active,
    /// Showing the fault fallback
    Faulted,
    /// Torn down
    Disposed,
}

/// User intents forwarded to the engine
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserAction {
    /// Drop the current selection and choose again
    ResetSelection,
    /// Confirm the framework the engine currently has selected
    Confirm,
    /// Continue into the flow for a framework
    StartDownstreamFlow {
        /// Framework to continue with
        framework_id: String,
    },
}

/// Orchestrates one screen instance
pub struct ConversationOrchestrator<E, R>
where
    E: ConversationEngine + ?Sized + 'static,
    R: RenderingCollaborator + ?Sized,
{
    id: ScreenId,
    engine: Arc<E>,
    renderer: Arc<R>,
    context: NavigationContext,
    breakpoints: BreakpointSet,
    gate: InitGate,
    boundary: ErrorBoundary,
    phase: Arc<Mutex<ScreenPhase>>,
    current_framework: Mutex<Option<String>>,
    alive: watch::Sender<bool>,
}

impl<E, R> ConversationOrchestrator<E, R>
where
    E: ConversationEngine + ?Sized + 'static,
    R: RenderingCollaborator + ?Sized,
{
    /// Create an orchestrator for a freshly navigated screen
    pub fn new(
        engine: Arc<E>,
        renderer: Arc<R>,
        scheduler: FrameScheduler,
        context: NavigationContext,
        config: &OrchestratorConfig,
    ) -> Self {
        let id = ScreenId::new();
        let (alive, _) = watch::channel(true);
        debug!(screen = %id, context = ?context, "Screen constructed");
        Self {
            gate: InitGate::new(id.clone(), scheduler),
            id,
            engine,
            renderer,
            context,
            breakpoints: config.breakpoints,
            boundary: ErrorBoundary::new(),
            phase: Arc::new(Mutex::new(ScreenPhase::Uninitialized)),
            current_framework: Mutex::new(None),
            alive,
        }
    }

    /// Screen instance identifier
    pub fn id(&self) -> &ScreenId {
        &self.id
    }

    /// Navigation parameters this screen was opened with
    pub fn context(&self) -> &NavigationContext {
        &self.context
    }

    /// The entry mode this screen resolves to
    pub fn entry_mode(&self) -> EntryMode {
        entry::resolve(&self.context)
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> ScreenPhase {
        *self.phase.lock()
    }

    /// Whether the one-shot entry dispatch has run
    pub fn init_state(&self) -> InitState {
        self.gate.state()
    }

    /// Status as shown to the surface
    pub fn status(&self) -> ScreenStatus {
        let phase = self.phase();
        if phase == ScreenPhase::Disposed {
            return ScreenStatus::Disposed;
        }
        if self.boundary.is_faulted() {
            return ScreenStatus::Faulted;
        }
        match phase {
            ScreenPhase::Uninitialized => ScreenStatus::Uninitialized,
            ScreenPhase::Initializing => ScreenStatus::Initializing,
            ScreenPhase::Active => ScreenStatus::Active,
            ScreenPhase::Disposed => ScreenStatus::Disposed,
        }
    }

    /// Framework the engine last reported as selected
    pub fn current_framework(&self) -> Option<String> {
        self.current_framework.lock().clone()
    }

    /// Mount the screen: schedule the entry dispatch for after the first frame
    ///
    /// Calling this again (e.g. on every build) has no further effect.
    pub fn mount(&self) {
        {
            let mut phase = self.phase.lock();
            if *phase != ScreenPhase::Uninitialized {
                return;
            }
            *phase = ScreenPhase::Initializing;
        }

        let mode = self.entry_mode();
        let engine = Arc::clone(&self.engine);
        let phase = Arc::clone(&self.phase);
        let screen = self.id.clone();

        debug!(screen = %self.id, mode = mode.name(), "Screen mounted");
        self.gate.run_once(move || {
            entry::dispatch(&mode, engine.as_ref());
            let mut phase = phase.lock();
            if *phase == ScreenPhase::Initializing {
                *phase = ScreenPhase::Active;
                info!(screen = %screen, "Screen active");
            }
        });
    }

    /// Forward one engine snapshot to the renderer
    pub fn apply_snapshot(&self, snapshot: &EngineSnapshot) {
        if self.phase() == ScreenPhase::Disposed {
            return;
        }
        (*self.current_framework.lock()).clone_from(&snapshot.current_framework_id);
        let shown = emotion::to_display(snapshot.current_emotion);
        debug!(screen = %self.id, emotion = shown.label(), "Engine emotion");
        self.renderer.show_emotion(shown);
    }

    /// Follow the engine's snapshot stream until it ends or the screen is disposed
    ///
    /// The current snapshot is applied first; after that every observed
    /// change. Intermediate values the engine overwrote before we looked are
    /// skipped, which is fine: only the latest state matters for display.
    pub async fn follow_engine(&self) {
        let mut snapshots = WatchStream::new(self.engine.subscribe());
        let disposed = wait_disposed(self.alive.subscribe());
        tokio::pin!(disposed);

        loop {
            tokio::select! {
                biased;

                next = snapshots.next() => match next {
                    Some(snapshot) => self.apply_snapshot(&snapshot),
                    None => {
                        debug!(screen = %self.id, "Engine stream closed");
                        break;
                    }
                },
                () = &mut disposed => break,
            }
        }
    }

    /// Resolve and forward the layout class for a width
    ///
    /// Called on every layout pass; nothing is cached.
    pub fn on_layout(&self, width: f64) -> LayoutClass {
        let class = self.breakpoints.classify(width);
        self.renderer.select_layout(class);
        class
    }

    /// Pick the layout variant for a width
    pub fn layout_for<'a, T>(&self, width: f64, variants: &'a LayoutVariants<T>) -> &'a T {
        layout::resolve(width, &self.breakpoints, variants)
    }

    /// Forward a user action to the engine
    ///
    /// Actions are only forwarded once the screen is `Active`, so nothing
    /// reaches the engine ahead of the entry call. Returns `false` when the
    /// action was dropped (screen not active, or nothing selected to confirm).
    pub fn handle_action(&self, action: UserAction) -> bool {
        let phase = self.phase();
        if phase != ScreenPhase::Active {
            warn!(screen = %self.id, phase = ?phase, action = ?action, "Action on inactive screen dropped");
            return false;
        }

        match action {
            UserAction::ResetSelection => {
                self.current_framework.lock().take();
                self.engine.reset_selection();
            }
            UserAction::Confirm => {
                let Some(framework_id) = self.current_framework() else {
                    warn!(screen = %self.id, "Confirm with nothing selected");
                    return false;
                };
                let choice = frameworks::choice_for(&framework_id);
                self.engine
                    .confirm_choice(&choice, self.context.marketing_source());
            }
            UserAction::StartDownstreamFlow { framework_id } => {
                self.engine.start_downstream_flow(&framework_id);
            }
        }
        true
    }

    /// Render the screen's subtree through its fault boundary
    pub fn render<V, F>(&self, subtree: F) -> Rendered<V>
    where
        F: FnOnce() -> anyhow::Result<V>,
    {
        self.boundary.render(subtree)
    }

    /// Fault state of the screen's boundary
    pub fn error_state(&self) -> ErrorState {
        self.boundary.state()
    }

    /// Shared handle to the screen's fault boundary
    pub fn boundary(&self) -> &ErrorBoundary {
        &self.boundary
    }

    /// User-initiated recovery from a render fault
    ///
    /// Clears the fault only. The entry dispatch is not repeated.
    pub fn reset_error(&self) -> bool {
        self.boundary.reset()
    }

    /// Tear the screen down; a pending entry dispatch is suppressed
    pub fn dispose(&self) {
        let previous = std::mem::replace(&mut *self.phase.lock(), ScreenPhase::Disposed);
        if previous != ScreenPhase::Disposed {
            debug!(screen = %self.id, from = ?previous, "Screen disposed");
        }
        self.gate.dispose();
        self.alive.send_replace(false);
    }
}

async fn wait_disposed(mut alive: watch::Receiver<bool>) {
    loop {
        let still_alive = *alive.borrow_and_update();
        if !still_alive {
            return;
        }
        if alive.changed().await.is_err() {
            return;
        }
    }
}
