//! Integration Test: Ownership Rules
//!
//! **Policy**: Process-wide and conversation-starting side effects each have
//! exactly one owner.
//!
//! - The panic hook is installed only by `orchestrator/core/src/fault.rs`
//!   (`ErrorCapture::install`). A second installer would silently replace
//!   the fault capture for every screen.
//! - Entry calls on the engine (`introduce_choice`, `start_guided_discovery`)
//!   are made only by `orchestrator/core/src/entry.rs`. Choice confirmation is
//!   also allowed from the orchestrator, for the user's Confirm action.
//! - The emotion bridge matches every variant explicitly, so adding an
//!   emotion on one side fails to compile until the other side has it too.

use architectural_enforcement::{find_outside, production_lines, report, workspace_root};

#[test]
fn test_panic_hook_installed_only_by_fault_module() {
    let violations = find_outside(
        &["panic::set_hook", "panic::take_hook", "panic::update_hook"],
        &["orchestrator/core/src/fault.rs"],
    );
    report(
        "Panic hooks may only be installed by ErrorCapture (orchestrator/core/src/fault.rs)",
        &violations,
    );
}

#[test]
fn test_entry_calls_only_from_entry_module() {
    let violations = find_outside(
        &[".introduce_choice(", ".start_guided_discovery("],
        &["orchestrator/core/src/entry.rs"],
    );
    report(
        "Entry calls on the engine may only be issued by entry::dispatch",
        &violations,
    );
}

#[test]
fn test_confirm_choice_only_from_entry_or_orchestrator() {
    let violations = find_outside(
        &[".confirm_choice("],
        &[
            "orchestrator/core/src/entry.rs",
            "orchestrator/core/src/orchestrator.rs",
        ],
    );
    report(
        "confirm_choice may only be issued by entry::dispatch or the orchestrator",
        &violations,
    );
}

#[test]
fn test_emotion_bridge_has_no_wildcard_arms() {
    let path = workspace_root().join("orchestrator/core/src/emotion.rs");
    let wildcards: Vec<String> = production_lines(&path)
        .into_iter()
        .filter(|(_, code)| code.starts_with("_ =>") || code.contains("| _ =>"))
        .map(|(line, code)| format!("emotion.rs:{line} - {code}"))
        .collect();

    if !wildcards.is_empty() {
        eprintln!("\n❌ Catch-all arms in the emotion bridge:\n");
        for w in &wildcards {
            eprintln!("  ❌ {w}");
        }
        panic!("The emotion bridge must match every variant explicitly");
    }
}
