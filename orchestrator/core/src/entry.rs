//! Entry Mode
//!
//! Decides how a screen starts its conversation. Resolution is a pure
//! function of the [`NavigationContext`]; dispatching the result is a
//! side effect that the orchestrator runs at most once per screen, inside an
//! [`InitGate`](crate::init_gate::InitGate).
//!
//! Priority (highest first):
//!
//! 1. a selected framework → [`EntryMode::Preselected`]
//! 2. the auto-start flag → [`EntryMode::AutoStart`]
//! 3. otherwise → [`EntryMode::Introduce`]

use serde::Serialize;
use tracing::info;

use crate::engine::ConversationEngine;
use crate::frameworks;
use crate::navigation::NavigationContext;

/// How a screen begins its conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum EntryMode {
    /// The user arrived with a framework chosen
    Preselected {
        /// Framework identifier, untrusted
        framework_id: String,
        /// Where the user came from
        source: Option<String>,
    },
    /// Start guided discovery immediately
    AutoStart,
    /// Introduce the choice from scratch
    Introduce,
}

impl EntryMode {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Preselected { .. } => "preselected",
            Self::AutoStart => "auto_start",
            Self::Introduce => "introduce",
        }
    }
}

/// Resolve the entry mode for a navigation context
#[must_use]
pub fn resolve(ctx: &NavigationContext) -> EntryMode {
    if let Some(framework_id) = ctx.selected_framework() {
        EntryMode::Preselected {
            framework_id: framework_id.to_string(),
            source: ctx.marketing_source().map(str::to_string),
        }
    } else if ctx.auto_start_requested() {
        EntryMode::AutoStart
    } else {
        EntryMode::Introduce
    }
}

/// Issue exactly one engine call for an entry mode
pub fn dispatch<E: ConversationEngine + ?Sized>(mode: &EntryMode, engine: &E) {
    info!(mode = mode.name(), "Dispatching entry mode");
    match mode {
        EntryMode::Preselected {
            framework_id,
            source,
        } => {
            let choice = frameworks::choice_for(framework_id);
            engine.confirm_choice(&choice, source.as_deref());
        }
        EntryMode::AutoStart => engine.start_guided_discovery(),
        EntryMode::Introduce => engine.introduce_choice(),
    }
}
