//! Responsive Breakpoints
//!
//! Picks a layout variant from the available width. Resolution is recomputed
//! on every layout pass: it is O(1) and must track the latest measurement, so
//! nothing here is cached.
//!
//! ```text
//!   0 ──── mobile ──── mobile_max ──── tablet ──── tablet_max ──── desktop ────▶ width
//!                    (first tablet px)           (first desktop px)
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default upper bound (exclusive) for the mobile layout, in logical pixels
pub const DEFAULT_MOBILE_MAX: f64 = 600.0;

/// Default upper bound (exclusive) for the tablet layout, in logical pixels
pub const DEFAULT_TABLET_MAX: f64 = 1200.0;

/// Invalid breakpoint thresholds
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BreakpointError {
    /// Thresholds must be strictly increasing
    #[error("mobile_max ({mobile_max}) must be less than tablet_max ({tablet_max})")]
    Unordered {
        /// Mobile threshold
        mobile_max: f64,
        /// Tablet threshold
        tablet_max: f64,
    },

    /// Thresholds must be finite
    #[error("breakpoint thresholds must be finite numbers")]
    NotFinite,
}

/// Width class a measurement falls into
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutClass {
    /// Narrow screens
    Mobile,
    /// Medium screens
    Tablet,
    /// Wide screens
    Desktop,
}

/// Ordered breakpoint thresholds
///
/// Invariant: `mobile_max < tablet_max`, both finite. Enforced by
/// [`BreakpointSet::new`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BreakpointSet {
    mobile_max: f64,
    tablet_max: f64,
}

impl Default for BreakpointSet {
    fn default() -> Self {
        Self {
            mobile_max: DEFAULT_MOBILE_MAX,
            tablet_max: DEFAULT_TABLET_MAX,
        }
    }
}

impl BreakpointSet {
    /// Create a breakpoint set, checking the ordering invariant
    ///
    /// # Errors
    ///
    /// Returns [`BreakpointError`] if a threshold is not finite or the
    /// thresholds are not strictly increasing.
    pub fn new(mobile_max: f64, tablet_max: f64) -> Result<Self, BreakpointError> {
        if !mobile_max.is_finite() || !tablet_max.is_finite() {
            return Err(BreakpointError::NotFinite);
        }
        if mobile_max >= tablet_max {
            return Err(BreakpointError::Unordered {
                mobile_max,
                tablet_max,
            });
        }
        Ok(Self {
            mobile_max,
            tablet_max,
        })
    }

    /// Upper bound (exclusive) of the mobile class
    #[must_use]
    pub fn mobile_max(&self) -> f64 {
        self.mobile_max
    }

    /// Upper bound (exclusive) of the tablet class
    #[must_use]
    pub fn tablet_max(&self) -> f64 {
        self.tablet_max
    }

    /// Classify a width
    ///
    /// A width that is not a number counts as mobile, the smallest layout.
    #[must_use]
    pub fn classify(&self, width: f64) -> LayoutClass {
        if width.is_nan() || width < self.mobile_max {
            LayoutClass::Mobile
        } else if width < self.tablet_max {
            LayoutClass::Tablet
        } else {
            LayoutClass::Desktop
        }
    }
}

/// Layout variants supplied by a screen
///
/// Only `mobile` is mandatory; missing variants degrade to the next smaller
/// one.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutVariants<T> {
    /// Always present
    pub mobile: T,
    /// Optional medium layout
    pub tablet: Option<T>,
    /// Optional wide layout
    pub desktop: Option<T>,
}

impl<T> LayoutVariants<T> {
    /// Variants with only a mobile layout
    pub fn mobile_only(mobile: T) -> Self {
        Self {
            mobile,
            tablet: None,
            desktop: None,
        }
    }

    /// Add a tablet layout
    #[must_use]
    pub fn with_tablet(mut self, tablet: T) -> Self {
        self.tablet = Some(tablet);
        self
    }

    /// Add a desktop layout
    #[must_use]
    pub fn with_desktop(mut self, desktop: T) -> Self {
        self.desktop = Some(desktop);
        self
    }

    /// The variant for a layout class, walking desktop → tablet → mobile
    pub fn for_class(&self, class: LayoutClass) -> &T {
        match class {
            LayoutClass::Desktop => self
                .desktop
                .as_ref()
                .or(self.tablet.as_ref())
                .unwrap_or(&self.mobile),
            LayoutClass::Tablet => self.tablet.as_ref().unwrap_or(&self.mobile),
            LayoutClass::Mobile => &self.mobile,
        }
    }
}

/// Pick the variant for a width. Never fails: `mobile` is always there.
pub fn resolve<'a, T>(width: f64, set: &BreakpointSet, variants: &'a LayoutVariants<T>) -> &'a T {
    variants.for_class(set.classify(width))
}
