//! Orchestrator Headless Driver
//!
//! Runs one screen through its whole lifecycle against the in-process
//! headless engine and prints a JSON summary of what reached the engine and
//! the renderer. Useful for checking entry-mode and breakpoint configuration
//! without a UI.
//!
//! # Usage
//!
//! ```bash
//! # Arrive with a framework already chosen
//! orchestrator-headless --framework gdpr --source newsletter
//!
//! # Auto-start, then walk through a few engine emotions at two widths
//! orchestrator-headless --auto-start --width 480 --width 1440 \
//!     --emotion focused --emotion celebrating
//!
//! # With verbose logging
//! RUST_LOG=debug orchestrator-headless
//! ```
//!
//! # Environment Variables
//!
//! - `ORCHESTRATOR_MOBILE_MAX`: Mobile/tablet breakpoint in logical pixels
//! - `ORCHESTRATOR_TABLET_MAX`: Tablet/desktop breakpoint in logical pixels
//! - `ORCHESTRATOR_FORWARD_PANICS`: Also run the default panic reporter
//! - `RUST_LOG`: Log level (trace, debug, info, warn, error)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use parking_lot::Mutex;
use tracing::{info, warn};

use avatar_orchestrator::{
    load_config, load_config_from_path, ConfigOverrides, ConversationOrchestrator,
    DisplayEmotion, EngineEmotion, ErrorCapture, FaultObserver, FrameScheduler, HeadlessEngine,
    LayoutClass, LoggingRenderer, NavigationContext, RenderingCollaborator,
    TracingFaultObserver, UserAction,
};

/// Drive one orchestrated screen without a UI
#[derive(Debug, Parser)]
#[command(name = "orchestrator-headless", version, about)]
struct Args {
    /// Framework the user arrived with
    #[arg(long)]
    framework: Option<String>,

    /// Campaign or referrer that brought the user here
    #[arg(long)]
    source: Option<String>,

    /// Start guided discovery immediately
    #[arg(long)]
    auto_start: bool,

    /// Layout width to resolve after the first frame (repeatable)
    #[arg(long = "width", value_name = "PX")]
    widths: Vec<f64>,

    /// Engine emotion to publish after entry (repeatable)
    #[arg(long = "emotion", value_name = "EMOTION", value_parser = parse_emotion)]
    emotions: Vec<EngineEmotion>,

    /// Confirm the engine's selection before leaving the screen
    #[arg(long)]
    confirm: bool,

    /// Fail the first render pass, then recover through the boundary
    #[arg(long)]
    simulate_fault: bool,

    /// Config file (default: $XDG_CONFIG_HOME/avatar-orchestrator/orchestrator.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the mobile/tablet breakpoint
    #[arg(long, value_name = "PX")]
    mobile_max: Option<f64>,

    /// Override the tablet/desktop breakpoint
    #[arg(long, value_name = "PX")]
    tablet_max: Option<f64>,
}

fn parse_emotion(raw: &str) -> Result<EngineEmotion, String> {
    let wanted = raw.trim().to_ascii_lowercase();
    EngineEmotion::ALL
        .into_iter()
        .find(|emotion| emotion.label() == wanted)
        .ok_or_else(|| {
            let known: Vec<&str> = EngineEmotion::ALL.iter().map(|e| e.label()).collect();
            format!("unknown emotion '{raw}' (expected one of: {})", known.join(", "))
        })
}

/// Logs like [`LoggingRenderer`] and keeps what it showed for the summary
#[derive(Default)]
struct SummaryRenderer {
    log: LoggingRenderer,
    emotions: Mutex<Vec<DisplayEmotion>>,
    layouts: Mutex<Vec<LayoutClass>>,
}

impl RenderingCollaborator for SummaryRenderer {
    fn show_emotion(&self, emotion: DisplayEmotion) {
        self.log.show_emotion(emotion);
        self.emotions.lock().push(emotion);
    }

    fn select_layout(&self, layout: LayoutClass) {
        self.log.select_layout(layout);
        self.layouts.lock().push(layout);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("orchestrator_headless=info".parse()?)
                .add_directive("avatar_orchestrator=info".parse()?),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut overrides = ConfigOverrides::new();
    if let Some(px) = args.mobile_max {
        overrides = overrides.with_mobile_max(px);
    }
    if let Some(px) = args.tablet_max {
        overrides = overrides.with_tablet_max(px);
    }
    let config = match &args.config {
        Some(path) => load_config_from_path(Some(path.as_path()), &overrides)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => load_config(&overrides).context("loading config")?,
    };
    info!(source = %config.source(), breakpoints = ?config.breakpoints, "Configuration loaded");

    let observer: Arc<dyn FaultObserver> = Arc::new(TracingFaultObserver);
    ErrorCapture::install(config.capture, Some(observer));

    let engine = Arc::new(HeadlessEngine::new());
    let renderer = Arc::new(SummaryRenderer::default());
    let scheduler = FrameScheduler::new();
    let context = NavigationContext::new(args.framework.clone(), args.source.clone(), args.auto_start);

    let screen = ConversationOrchestrator::new(
        Arc::clone(&engine),
        Arc::clone(&renderer),
        scheduler.clone(),
        context,
        &config,
    );
    info!(screen = %screen.id(), mode = screen.entry_mode().name(), "Opening screen");

    // First build and frame: entry dispatch runs after this commit.
    screen.mount();
    let first_pass = screen.render(|| {
        if args.simulate_fault {
            anyhow::bail!("simulated render fault");
        }
        Ok(())
    });
    scheduler.commit_frame();
    if first_pass.is_fallback() {
        warn!(status = ?screen.status(), "First pass faulted, resetting boundary");
        screen.reset_error();
    }

    for width in &args.widths {
        screen.on_layout(*width);
        scheduler.commit_frame();
    }

    let follow = screen.follow_engine();
    let drive = async {
        for emotion in &args.emotions {
            let seen = renderer.emotions.lock().len();
            let mut snapshot = engine.current();
            snapshot.current_emotion = *emotion;
            engine.publish(snapshot);
            wait_for_render(&renderer, seen).await;
        }
        if args.confirm && !screen.handle_action(UserAction::Confirm) {
            warn!("Nothing selected to confirm");
        }
        screen.dispose();
    };
    tokio::join!(follow, drive);

    let summary = serde_json::json!({
        "screen": screen.id(),
        "entry_mode": screen.entry_mode(),
        "status": screen.status(),
        "config_source": config.source().to_string(),
        "engine": {
            "intents": engine.intents(),
            "latest": engine.current(),
        },
        "renderer": {
            "emotions": renderer.emotions.lock().clone(),
            "layouts": renderer.layouts.lock().clone(),
        },
        "frames": scheduler.frame_count(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}

/// Yield until the renderer has shown more than `seen` emotions
async fn wait_for_render(renderer: &SummaryRenderer, seen: usize) {
    for _ in 0..100 {
        if renderer.emotions.lock().len() > seen {
            return;
        }
        tokio::task::yield_now().await;
    }
    warn!("Engine snapshot not rendered");
}
