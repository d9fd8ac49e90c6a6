//! In-process headless engine
//!
//! A deterministic stand-in for the real conversation engine. It keeps every
//! intent it receives and answers each one with a snapshot, so a screen can
//! be driven end to end without a personality backend. Used by the headless
//! driver binary and by the integration tests.

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::info;

use super::{ConversationEngine, EngineEmotion, EngineIntent, EngineSnapshot, FrameworkChoice};

/// Engine that records intents and publishes canned snapshots
pub struct HeadlessEngine {
    intents: Mutex<Vec<EngineIntent>>,
    snapshots: watch::Sender<EngineSnapshot>,
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessEngine {
    /// Create an engine in the neutral state with no selection
    #[must_use]
    pub fn new() -> Self {
        let (snapshots, _) = watch::channel(EngineSnapshot::default());
        Self {
            intents: Mutex::new(Vec::new()),
            snapshots,
        }
    }

    /// All intents received so far, oldest first
    pub fn intents(&self) -> Vec<EngineIntent> {
        self.intents.lock().clone()
    }

    /// Number of conversation-starting intents received
    pub fn entry_count(&self) -> usize {
        self.intents.lock().iter().filter(|i| i.is_entry()).count()
    }

    /// Latest published snapshot
    pub fn current(&self) -> EngineSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Publish a snapshot as if the engine changed state on its own
    pub fn publish(&self, snapshot: EngineSnapshot) {
        self.snapshots.send_replace(snapshot);
    }

    fn record(&self, intent: EngineIntent, snapshot: EngineSnapshot) {
        info!(intent = ?intent, emotion = snapshot.current_emotion.label(), "Engine intent");
        self.intents.lock().push(intent);
        self.publish(snapshot);
    }
}

impl ConversationEngine for HeadlessEngine {
    fn confirm_choice(&self, choice: &FrameworkChoice, source: Option<&str>) {
        self.record(
            EngineIntent::ConfirmChoice {
                choice: choice.clone(),
                source: source.map(str::to_string),
            },
            EngineSnapshot {
                current_framework_id: Some(choice.id.clone()),
                current_emotion: EngineEmotion::Celebrating,
            },
        );
    }

    fn start_guided_discovery(&self) {
        self.record(
            EngineIntent::StartGuidedDiscovery,
            EngineSnapshot::with_emotion(EngineEmotion::Focused),
        );
    }

    fn introduce_choice(&self) {
        self.record(
            EngineIntent::IntroduceChoice,
            EngineSnapshot::with_emotion(EngineEmotion::Welcoming),
        );
    }

    fn reset_selection(&self) {
        self.record(
            EngineIntent::ResetSelection,
            EngineSnapshot::with_emotion(EngineEmotion::Neutral),
        );
    }

    fn start_downstream_flow(&self, framework_id: &str) {
        self.record(
            EngineIntent::StartDownstreamFlow {
                framework_id: framework_id.to_string(),
            },
            EngineSnapshot {
                current_framework_id: Some(framework_id.to_string()),
                current_emotion: EngineEmotion::Encouraging,
            },
        );
    }

    fn subscribe(&self) -> watch::Receiver<EngineSnapshot> {
        self.snapshots.subscribe()
    }
}
