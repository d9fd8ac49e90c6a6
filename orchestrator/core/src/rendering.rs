//! Rendering Collaborator
//!
//! What the orchestrator tells the avatar surface: which emotion to animate
//! and which layout class to use. How the avatar is drawn (sprites, meshes,
//! SVG) is entirely up to the surface.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::layout::LayoutClass;

/// Emotions the avatar renderer knows how to animate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayEmotion {
    /// Idle expression
    #[default]
    Neutral,
    /// Smiling
    Happy,
    /// Attentive, leaning in
    Focused,
    /// Nodding along
    Encouraging,
    /// Calm and steady
    Serious,
    /// Furrowed brow
    Concerned,
    /// Confetti
    Celebrating,
    /// Waving hello
    Welcoming,
    /// Open, offering gesture
    Helpful,
}

impl DisplayEmotion {
    /// Every display emotion, in canonical order
    pub const ALL: [DisplayEmotion; 9] = [
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

    /// Semantic label shared with the engine vocabulary
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

    /// Suggested animation name for this emotion
    #[must_use]
    pub fn suggested_animation(&self) -> &'static str {
        match self {
            Self::Neutral | Self::Serious => "idle",
            Self::Happy | Self::Welcoming => "happy",
            Self::Focused => "thinking",
            Self::Encouraging | Self::Helpful => "talking",
            Self::Concerned => "waiting",
            Self::Celebrating => "celebrate",
        }
    }
}

/// Surface that draws the avatar and lays out the screen
pub trait RenderingCollaborator: Send + Sync {
    /// Animate the avatar with this emotion
    fn show_emotion(&self, emotion: DisplayEmotion);

    /// Switch to the layout for this width class
    fn select_layout(&self, layout: LayoutClass);
}

/// Renderer that only logs what it would draw
#[derive(Clone, Copy, Debug, Default)]
pub struct LoggingRenderer;

impl RenderingCollaborator for LoggingRenderer {
    fn show_emotion(&self, emotion: DisplayEmotion) {
        info!(
            emotion = emotion.label(),
            animation = emotion.suggested_animation(),
            "Avatar emotion"
        );
    }

    fn select_layout(&self, layout: LayoutClass) {
        info!(layout = ?layout, "Layout selected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_emotion_labels_are_unique() {
        let labels: std::collections::HashSet<_> =
            DisplayEmotion::ALL.iter().map(|e| e.label()).collect();
        assert_eq!(labels.len(), DisplayEmotion::ALL.len());
    }

    #[test]
    fn test_suggested_animation() {
        assert_eq!(DisplayEmotion::Focused.suggested_animation(), "thinking");
        assert_eq!(DisplayEmotion::Celebrating.suggested_animation(), "celebrate");
        assert_eq!(DisplayEmotion::Neutral.suggested_animation(), "idle");
    }
}
