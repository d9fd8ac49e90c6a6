//! Test Utilities
//!
//! Recording collaborators for exercising the orchestrator without a real
//! avatar surface or analytics sink.
//!
//! # Usage
//!
//! ```ignore
//! use avatar_orchestrator::test_utils::RecordingRenderer;
//!
//! let renderer = Arc::new(RecordingRenderer::default());
//! // ... drive a screen ...
//! assert_eq!(renderer.last_emotion(), Some(DisplayEmotion::Welcoming));
//! ```

use parking_lot::Mutex;

use crate::fault::{FaultDetails, FaultObserver};
use crate::layout::LayoutClass;
use crate::rendering::{DisplayEmotion, RenderingCollaborator};

/// Renderer that remembers everything it was asked to show
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    emotions: Mutex<Vec<DisplayEmotion>>,
    layouts: Mutex<Vec<LayoutClass>>,
}

impl RecordingRenderer {
    /// Every emotion shown, oldest first
    pub fn emotions(&self) -> Vec<DisplayEmotion> {
        self.emotions.lock().clone()
    }

    /// Most recent emotion
    pub fn last_emotion(&self) -> Option<DisplayEmotion> {
        self.emotions.lock().last().copied()
    }

    /// Every layout selected, oldest first
    pub fn layouts(&self) -> Vec<LayoutClass> {
        self.layouts.lock().clone()
    }
}

impl RenderingCollaborator for RecordingRenderer {
    fn show_emotion(&self, emotion: DisplayEmotion) {
        self.emotions.lock().push(emotion);
    }

    fn select_layout(&self, layout: LayoutClass) {
        self.layouts.lock().push(layout);
    }
}

/// Fault observer that keeps every fault it sees
#[derive(Debug, Default)]
pub struct RecordingObserver {
    faults: Mutex<Vec<FaultDetails>>,
}

impl RecordingObserver {
    /// Every observed fault, oldest first
    pub fn faults(&self) -> Vec<FaultDetails> {
        self.faults.lock().clone()
    }

    /// Whether any observed fault message contains `needle`
    ///
    /// The panic hook is process-wide, so tests running in parallel share one
    /// observer; match on a message unique to the test.
    pub fn contains(&self, needle: &str) -> bool {
        self.faults
            .lock()
            .iter()
            .any(|fault| fault.message.contains(needle))
    }
}

impl FaultObserver for RecordingObserver {
    fn observe(&self, details: &FaultDetails) {
        self.faults.lock().push(details.clone());
    }
}
