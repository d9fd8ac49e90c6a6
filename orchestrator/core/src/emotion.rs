//! Emotion Bridge
//!
//! Converts between the engine's emotion vocabulary ([`EngineEmotion`]) and the
//! avatar renderer's vocabulary ([`DisplayEmotion`]).
//!
//! The two enums carry the same nine labels but live in different modules so
//! the engine and the renderer can evolve on their own schedules. Every
//! conversion below is an exhaustive `match` with no wildcard arm: adding a
//! variant to either vocabulary stops the crate from compiling until both
//! directions are updated. There is no "fall back to neutral" path.
//!
//! The const block at the bottom repeats that check for the `ALL` tables, so
//! the pairing `EngineEmotion::ALL[i] <-> DisplayEmotion::ALL[i]` is verified
//! at build time as well.

use crate::engine::EngineEmotion;
use crate::rendering::DisplayEmotion;

/// Convert an engine emotion into the emotion the avatar should display.
///
/// Precondition: the engine only produces values from the closed set. An
/// out-of-set value cannot be represented by [`EngineEmotion`] at all.
#[must_use]
pub const fn to_display(emotion: EngineEmotion) -> DisplayEmotion {
    match emotion {
        EngineEmotion::Neutral => DisplayEmotion::Neutral,
        EngineEmotion::Happy => DisplayEmotion::Happy,
        EngineEmotion::Focused => DisplayEmotion::Focused,
        EngineEmotion::Encouraging => DisplayEmotion::Encouraging,
        EngineEmotion::Serious => DisplayEmotion::Serious,
        EngineEmotion::Concerned => DisplayEmotion::Concerned,
        EngineEmotion::Celebrating => DisplayEmotion::Celebrating,
        EngineEmotion::Welcoming => DisplayEmotion::Welcoming,
        EngineEmotion::Helpful => DisplayEmotion::Helpful,
    }
}

/// Convert a displayed emotion back into the engine vocabulary.
#[must_use]
pub const fn to_engine(emotion: DisplayEmotion) -> EngineEmotion {
    match emotion {
        DisplayEmotion::Neutral => EngineEmotion::Neutral,
        DisplayEmotion::Happy => EngineEmotion::Happy,
        DisplayEmotion::Focused => EngineEmotion::Focused,
        DisplayEmotion::Encouraging => EngineEmotion::Encouraging,
        DisplayEmotion::Serious => EngineEmotion::Serious,
        DisplayEmotion::Concerned => EngineEmotion::Concerned,
        DisplayEmotion::Celebrating => EngineEmotion::Celebrating,
        DisplayEmotion::Welcoming => EngineEmotion::Welcoming,
        DisplayEmotion::Helpful => EngineEmotion::Helpful,
    }
}

impl From<EngineEmotion> for DisplayEmotion {
    fn from(emotion: EngineEmotion) -> Self {
        to_display(emotion)
    }
}

impl From<DisplayEmotion> for EngineEmotion {
    fn from(emotion: DisplayEmotion) -> Self {
        to_engine(emotion)
    }
}

// Both tables must list the same labels in the same order, and both
// conversions must agree with that order.
const _: () = {
    assert!(EngineEmotion::ALL.len() == DisplayEmotion::ALL.len());
    let mut i = 0;
    while i < EngineEmotion::ALL.len() {
        assert!(to_display(EngineEmotion::ALL[i]) as u8 == DisplayEmotion::ALL[i] as u8);
        assert!(to_engine(DisplayEmotion::ALL[i]) as u8 == EngineEmotion::ALL[i] as u8);
        i += 1;
    }
};
