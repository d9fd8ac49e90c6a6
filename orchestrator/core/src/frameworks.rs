//! Framework Catalog
//!
//! Display names for the compliance frameworks a user can arrive with. The
//! identifier comes from untrusted deep-link or query input, so lookup never
//! fails: an unknown identifier is echoed back uppercased.

use std::borrow::Cow;

use tracing::warn;

use crate::engine::FrameworkChoice;

/// Known framework identifiers and their display names
pub const KNOWN_FRAMEWORKS: &[(&str, &str)] = &[
    ("soc2", "SOC 2"),
    ("gdpr", "GDPR"),
    ("iso27001", "ISO 27001"),
    ("hipaa", "HIPAA"),
    ("pci-dss", "PCI DSS"),
    ("nist", "NIST CSF"),
];

/// Whether an identifier is in the catalog
#[must_use]
pub fn is_known(id: &str) -> bool {
    lookup(id).is_some()
}

fn lookup(id: &str) -> Option<&'static str> {
    KNOWN_FRAMEWORKS
        .iter()
        .find(|(known, _)| *known == id)
        .map(|(_, name)| *name)
}

/// Display name for a framework identifier
///
/// Known identifiers map to their catalog name. Anything else is returned
/// uppercased, unchanged otherwise.
#[must_use]
pub fn display_name(id: &str) -> Cow<'static, str> {
    match lookup(id) {
        Some(name) => Cow::Borrowed(name),
        None => {
            warn!(framework_id = %id, "Unknown framework id, echoing it");
            Cow::Owned(id.to_uppercase())
        }
    }
}

/// Build the choice sent to the engine for an identifier
#[must_use]
pub fn choice_for(id: &str) -> FrameworkChoice {
    FrameworkChoice {
        id: id.to_string(),
        display_name: display_name(id).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_known_display_names() {
        assert_eq!(display_name("soc2"), "SOC 2");
        assert_eq!(display_name("gdpr"), "GDPR");
        assert_eq!(display_name("iso27001"), "ISO 27001");
        assert_eq!(display_name("hipaa"), "HIPAA");
        assert_eq!(display_name("pci-dss"), "PCI DSS");
        assert_eq!(display_name("nist"), "NIST CSF");
    }

    #[test]
    fn test_unknown_id_is_uppercased() {
        assert_eq!(display_name("made-up-id"), "MADE-UP-ID");
    }

    #[test]
    fn test_lookup_is_exact() {
        assert!(!is_known("GDPR"));
        assert_eq!(display_name("GDPR"), "GDPR");
        assert_eq!(display_name("Soc2"), "SOC2");
    }

    #[test]
    fn test_hostile_input_does_not_panic() {
        assert_eq!(display_name(""), "");
        assert_eq!(display_name("ß<script>"), "SS<SCRIPT>");
        let long = "x".repeat(10_000);
        assert_eq!(display_name(&long).len(), 10_000);
    }

    #[test]
    fn test_choice_for() {
        let choice = choice_for("pci-dss");
        assert_eq!(choice.id, "pci-dss");
        assert_eq!(choice.display_name, "PCI DSS");
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut ids: Vec<_> = KNOWN_FRAMEWORKS.iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), KNOWN_FRAMEWORKS.len());
    }
}
