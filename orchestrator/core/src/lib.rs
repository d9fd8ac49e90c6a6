//! Avatar Orchestrator - Screen Orchestration for the Avatar-First Interface
//!
//! Instead of lists and forms, the avatar-first interface walks users through
//! decisions (such as picking a compliance framework) in conversation. This
//! crate is the coordination layer between a screen, the conversation engine,
//! and the avatar renderer. It decides *when* each collaborator is called and
//! *with what state*; it does not hold dialogue policy or draw anything.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │                       Screen (per navigation)                      │
//! │                                                                    │
//! │  NavigationContext ─┐                                              │
//! │                     ▼                                              │
//! │  ┌──────────────────────────────────────────────────────────────┐  │
//! │  │                 ConversationOrchestrator                     │  │
//! │  │  ┌───────────┐  ┌───────────┐  ┌──────────┐  ┌────────────┐  │  │
//! │  │  │ EntryMode │  │ InitGate  │  │ Emotion  │  │ Breakpoint │  │  │
//! │  │  │ Resolver  │─▶│ (1 shot)  │  │ Bridge   │  │ Resolver   │  │  │
//! │  │  └───────────┘  └─────┬─────┘  └────▲─────┘  └─────┬──────┘  │  │
//! │  │        ErrorBoundary  │             │              │         │  │
//! │  └───────────────────────┼─────────────┼──────────────┼─────────┘  │
//! └──────────────────────────┼─────────────┼──────────────┼────────────┘
//!                            ▼             │              ▼
//!                  ConversationEngine ─snapshots   RenderingCollaborator
//! ```
//!
//! # Key Types
//!
//! - [`ConversationOrchestrator`]: drives one screen's lifecycle
//! - [`EngineEmotion`] / [`DisplayEmotion`]: the two emotion vocabularies,
//!   bridged by [`emotion::to_display`] and [`emotion::to_engine`]
//! - [`EntryMode`]: how a screen starts its conversation
//! - [`InitGate`]: run-once-after-first-frame latch
//! - [`ErrorCapture`] / [`ErrorBoundary`]: render fault capture and recovery
//! - [`BreakpointSet`]: responsive layout thresholds
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use avatar_orchestrator::{
//!     ConversationOrchestrator, ErrorCapture, FrameScheduler, HeadlessEngine,
//!     LoggingRenderer, NavigationContext, OrchestratorConfig,
//! };
//!
//! let config = OrchestratorConfig::default();
//! ErrorCapture::install(config.capture, None);
//!
//! let scheduler = FrameScheduler::new();
//! let screen = ConversationOrchestrator::new(
//!     Arc::new(HeadlessEngine::new()),
//!     Arc::new(LoggingRenderer),
//!     scheduler.clone(),
//!     NavigationContext::preselected("gdpr"),
//!     &config,
//! );
//!
//! screen.mount();
//! screen.on_layout(1024.0);
//! scheduler.commit_frame(); // entry dispatch happens here, once
//! ```
//!
//! # Module Overview
//!
//! - [`emotion`]: engine ↔ display emotion bridge
//! - [`engine`]: conversation engine boundary and headless engine
//! - [`rendering`]: rendering collaborator boundary
//! - [`layout`]: breakpoint resolution
//! - [`fault`]: process-wide error capture and fault boundaries
//! - [`frame`]: post-frame callback scheduling
//! - [`init_gate`]: one-shot deferred initialization
//! - [`navigation`]: navigation parameters
//! - [`frameworks`]: framework display names
//! - [`entry`]: entry mode resolution and dispatch
//! - [`orchestrator`]: the per-screen orchestrator
//! - [`config`]: TOML/env/CLI configuration
//! - [`test_utils`]: recording collaborators for tests
//!
//! # No UI Dependencies
//!
//! Like the conductor it grew out of, this crate does not depend on any UI
//! framework. Surfaces implement [`RenderingCollaborator`] and call
//! [`FrameScheduler::commit_frame`] from their own render loop.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod emotion;
pub mod engine;
pub mod entry;
pub mod fault;
pub mod frame;
pub mod frameworks;
pub mod init_gate;
pub mod layout;
pub mod navigation;
pub mod orchestrator;
pub mod rendering;
pub mod test_utils;

// Re-exports for convenience
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, OrchestratorConfig, OrchestratorToml,
};
pub use engine::{
    ConversationEngine, EngineEmotion, EngineIntent, EngineSnapshot, FrameworkChoice,
    HeadlessEngine,
};
pub use entry::EntryMode;
pub use fault::{
    CaptureConfig, ErrorBoundary, ErrorCapture, ErrorState, FaultDetails, FaultObserver, Rendered,
    TracingFaultObserver,
};
pub use frame::FrameScheduler;
pub use init_gate::{InitGate, InitState};
pub use layout::{BreakpointError, BreakpointSet, LayoutClass, LayoutVariants};
pub use navigation::NavigationContext;
pub use orchestrator::{ConversationOrchestrator, ScreenId, ScreenPhase, ScreenStatus, UserAction};
pub use rendering::{DisplayEmotion, LoggingRenderer, RenderingCollaborator};
