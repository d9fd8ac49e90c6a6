//! Navigation Context
//!
//! The read-only record a screen receives when it is navigated to. Route
//! matching and query parsing happen upstream; this type only holds the
//! result.

use serde::Serialize;

/// Parameters a screen was opened with
///
/// Immutable once built. Blank strings are normalized to `None` on
/// construction, so an empty `?framework=` never counts as a selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct NavigationContext {
    selected_framework: Option<String>,
    marketing_source: Option<String>,
    auto_start: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

impl NavigationContext {
    /// Build a context from raw navigation parameters
    #[must_use]
    pub fn new(
        selected_framework: Option<String>,
        marketing_source: Option<String>,
        auto_start: bool,
    ) -> Self {
        Self {
            selected_framework: non_blank(selected_framework),
            marketing_source: non_blank(marketing_source),
            auto_start,
        }
    }

    /// Context for a user who arrived with a framework already chosen
    #[must_use]
    pub fn preselected(framework: impl Into<String>) -> Self {
        Self::new(Some(framework.into()), None, false)
    }

    /// Context asking the screen to start guided discovery
    #[must_use]
    pub fn auto_start() -> Self {
        Self::new(None, None, true)
    }

    /// Attach a marketing source
    #[must_use]
    pub fn with_source(self, source: impl Into<String>) -> Self {
        Self::new(self.selected_framework, Some(source.into()), self.auto_start)
    }

    /// Attach the auto-start flag
    #[must_use]
    pub fn with_auto_start(mut self, auto_start: bool) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Framework chosen before arriving, if any
    #[must_use]
    pub fn selected_framework(&self) -> Option<&str> {
        self.selected_framework.as_deref()
    }

    /// Campaign or referrer that brought the user here
    #[must_use]
    pub fn marketing_source(&self) -> Option<&str> {
        self.marketing_source.as_deref()
    }

    /// Whether to jump straight into guided discovery
    #[must_use]
    pub fn auto_start_requested(&self) -> bool {
        self.auto_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_context_is_empty() {
        let ctx = NavigationContext::default();
        assert_eq!(ctx.selected_framework(), None);
        assert_eq!(ctx.marketing_source(), None);
        assert!(!ctx.auto_start_requested());
    }

    #[test]
    fn test_blank_values_are_absent() {
        let ctx = NavigationContext::new(Some("   ".to_string()), Some(String::new()), false);
        assert_eq!(ctx.selected_framework(), None);
        assert_eq!(ctx.marketing_source(), None);
    }

    #[test]
    fn test_values_are_trimmed() {
        let ctx = NavigationContext::preselected(" gdpr ").with_source("ads ");
        assert_eq!(ctx.selected_framework(), Some("gdpr"));
        assert_eq!(ctx.marketing_source(), Some("ads"));
    }

    #[test]
    fn test_builders_compose() {
        let ctx = NavigationContext::preselected("soc2").with_auto_start(true);
        assert_eq!(ctx.selected_framework(), Some("soc2"));
        assert!(ctx.auto_start_requested());
    }
}
