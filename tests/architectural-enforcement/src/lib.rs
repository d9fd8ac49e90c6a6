//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce ownership rules of
//! the orchestrator workspace:
//! - Only the fault module installs the process-wide panic hook
//! - Only entry resolution starts a conversation on the engine
//! - The emotion bridge has no catch-all arms
//!
//! The helpers here scan production sources line by line. Comments and
//! everything from the first `#[cfg(test)]` onwards are ignored.

use std::fs;
use std::path::{Path, PathBuf};

/// One offending source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File the line is in, relative to the workspace root
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The trimmed source line
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.file.display(), self.line, self.text)
    }
}

/// Workspace root, two levels above this crate
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

/// Production source directories scanned by every rule
pub const PRODUCTION_DIRS: &[&str] = &["orchestrator/core/src", "orchestrator/headless/src"];

/// All `.rs` files under a workspace-relative directory
pub fn rust_files(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root();
    let path = root.join(dir);
    if !path.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Non-test, non-comment lines of a file as `(line_number, code)` pairs
pub fn production_lines(path: &Path) -> Vec<(usize, String)> {
    let Ok(content) = fs::read_to_string(path) else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with("#[cfg(test)]") {
            break;
        }
        // Skip comments
        let code = line.split("//").next().unwrap_or(line).trim();
        if code.is_empty() {
            continue;
        }
        lines.push((idx + 1, code.to_string()));
    }
    lines
}

/// Find production lines containing any of `patterns`, outside `allowed` files
///
/// `allowed` entries are workspace-relative file paths.
pub fn find_outside(patterns: &[&str], allowed: &[&str]) -> Vec<Violation> {
    let root = workspace_root();
    let allowed: Vec<PathBuf> = allowed.iter().map(|a| root.join(a)).collect();

    let mut violations = Vec::new();
    for dir in PRODUCTION_DIRS {
        for file in rust_files(dir) {
            if allowed.iter().any(|a| same_file(a, &file)) {
                continue;
            }
            for (line, code) in production_lines(&file) {
                if patterns.iter().any(|p| code.contains(p)) {
                    violations.push(Violation {
                        file: file.strip_prefix(&root).unwrap_or(&file).to_path_buf(),
                        line,
                        text: code,
                    });
                }
            }
        }
    }
    violations
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// Print violations and fail the test
pub fn report(rule: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {rule}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    panic!(
        "\nFound {} violation(s) of: {rule}\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_skip_comments_and_tests() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sample.rs");
        fs::write(
            &file,
            "fn a() {}\n// panic::set_hook\nlet x = 1; // trailing\n#[cfg(test)]\nmod tests {}\n",
        )
        .unwrap();

        let lines = production_lines(&file);
        assert_eq!(
            lines,
            vec![(1, "fn a() {}".to_string()), (3, "let x = 1;".to_string())]
        );
    }

    #[test]
    fn test_production_dirs_exist() {
        for dir in PRODUCTION_DIRS {
            assert!(!rust_files(dir).is_empty(), "no sources under {dir}");
        }
    }
}
