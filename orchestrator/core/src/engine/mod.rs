//! Conversation Engine Boundary
//!
//! The orchestrator never talks dialogue policy. It only knows the handful of
//! intents a screen can send to the conversation engine and the snapshots the
//! engine pushes back. The engine's own history, personality, and voice
//! subsystems stay behind this trait.
//!
//! # Snapshot Delivery
//!
//! Snapshots travel over a [`tokio::sync::watch`] channel. A watch receiver
//! only ever observes the latest value, which is exactly the last-write-wins
//! contract the avatar needs: a late snapshot never overwrites a newer one.

pub mod headless;

pub use headless::HeadlessEngine;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Emotions produced by the reasoning/personality engine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineEmotion {
    /// Resting state
    #[default]
    Neutral,
    /// Pleased with the conversation
    Happy,
    /// Concentrating on the user's answers
    Focused,
    /// Nudging the user forward
    Encouraging,
    /// Discussing something weighty
    Serious,
    /// Worried about a gap or risk
    Concerned,
    /// A decision was made
    Celebrating,
    /// Greeting the user
    Welcoming,
    /// Offering assistance
    Helpful,
}

impl EngineEmotion {
    /// Every engine emotion, in canonical order
    pub const ALL: [EngineEmotion; 9] = [
        Self::Neutral,
        Self::Happy,
        Self::Focused,
        Self::Encouraging,
        Self::Serious,
        Self::Concerned,
        Self::Celebrating,
        Self::Welcoming,
        Self::Helpful,
    ];

    /// Semantic label shared with the display vocabulary
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Happy => "happy",
            Self::Focused => "focused",
            Self::Encouraging => "encouraging",
            Self::Serious => "serious",
            Self::Concerned => "concerned",
            Self::Celebrating => "celebrating",
            Self::Welcoming => "welcoming",
            Self::Helpful => "helpful",
        }
    }
}

/// State pushed by the engine after it processes an intent
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Framework the conversation currently centres on, if any
    pub current_framework_id: Option<String>,
    /// Emotion the engine wants the avatar to express
    pub current_emotion: EngineEmotion,
}

impl EngineSnapshot {
    /// Snapshot with an emotion and no selected framework
    #[must_use]
    pub fn with_emotion(emotion: EngineEmotion) -> Self {
        Self {
            current_framework_id: None,
            current_emotion: emotion,
        }
    }
}

/// A framework identifier together with its human-readable name
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameworkChoice {
    /// Identifier as received from navigation (e.g. `gdpr`)
    pub id: String,
    /// Name shown and spoken to the user (e.g. `GDPR`)
    pub display_name: String,
}

/// Every call the orchestrator can make on the engine
///
/// Used by recording engines and by log output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineIntent {
    /// Confirm a choice the user arrived with
    ConfirmChoice {
        /// The chosen framework
        choice: FrameworkChoice,
        /// Where the user came from (marketing campaign, deep link, ...)
        source: Option<String>,
    },
    /// Start the guided discovery conversation
    StartGuidedDiscovery,
    /// Introduce the available choices
    IntroduceChoice,
    /// Forget the current selection
    ResetSelection,
    /// Hand the selected framework to the next flow
    StartDownstreamFlow {
        /// Framework the downstream flow works on
        framework_id: String,
    },
}

impl EngineIntent {
    /// Whether this intent starts a conversation (one of the entry actions)
    #[must_use]
    pub fn is_entry(&self) -> bool {
        matches!(
            self,
            Self::ConfirmChoice { .. } | Self::StartGuidedDiscovery | Self::IntroduceChoice
        )
    }
}

/// Handle to the external conversation engine
///
/// Every method is fire-and-forget: it issues the intent and returns. The
/// engine reports the outcome later through [`ConversationEngine::subscribe`].
/// Timeouts and retries are the engine's business.
pub trait ConversationEngine: Send + Sync {
    /// Confirm a framework the user already picked
    fn confirm_choice(&self, choice: &FrameworkChoice, source: Option<&str>);

    /// Start the guided discovery flow
    fn start_guided_discovery(&self);

    /// Introduce the choice to a user who arrived without context
    fn introduce_choice(&self);

    /// Clear the current selection
    fn reset_selection(&self);

    /// Begin the flow that follows a confirmed choice
    fn start_downstream_flow(&self, framework_id: &str);

    /// Subscribe to engine state snapshots
    fn subscribe(&self) -> watch::Receiver<EngineSnapshot>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_engine_emotion_default_is_neutral() {
        assert_eq!(EngineEmotion::default(), EngineEmotion::Neutral);
    }

    #[test]
    fn test_engine_emotion_serde_lowercase() {
        let json = serde_json::to_string(&EngineEmotion::Celebrating).unwrap();
        assert_eq!(json, "\"celebrating\"");
        let back: EngineEmotion = serde_json::from_str("\"welcoming\"").unwrap();
        assert_eq!(back, EngineEmotion::Welcoming);
    }

    #[test]
    fn test_out_of_set_emotion_is_rejected_at_the_boundary() {
        let parsed: Result<EngineEmotion, _> = serde_json::from_str("\"furious\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_snapshot_deserializes_from_engine_json() {
        let snapshot: EngineSnapshot = serde_json::from_str(
            r#"{"current_framework_id":"soc2","current_emotion":"focused"}"#,
        )
        .unwrap();
        assert_eq!(snapshot.current_framework_id.as_deref(), Some("soc2"));
        assert_eq!(snapshot.current_emotion, EngineEmotion::Focused);
    }

    #[test]
    fn test_entry_intents() {
        assert!(EngineIntent::IntroduceChoice.is_entry());
        assert!(EngineIntent::StartGuidedDiscovery.is_entry());
        assert!(!EngineIntent::ResetSelection.is_entry());
        assert!(!EngineIntent::StartDownstreamFlow {
            framework_id: "gdpr".to_string()
        }
        .is_entry());
    }
}
