//! Session state shared between user controls and the frame render step.

use crate::constants::NO_FILTER;
use log::info;
use std::fmt;

/// Which overlay the user has selected
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FilterSelection {
    /// Overlay disabled
    #[default]
    None,
    /// A filter by name; the name may or may not exist in the registry
    Named(String),
}

impl FilterSelection {
    /// Parse a selection from a control name, treating `"none"` as `None`
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name == NO_FILTER {
            Self::None
        } else {
            Self::Named(name.to_string())
        }
    }

    /// Name of the selected filter, if any
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Named(name) => Some(name),
        }
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name().unwrap_or(NO_FILTER))
    }
}

/// Asset loading phase. Transitions only from `Loading` to `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Readiness {
    #[default]
    Loading,
    Ready,
}

/// Mutable per-session state read by every render step
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    selection: FilterSelection,
    readiness: Readiness,
}

impl SessionState {
    /// New session: loading, no filter selected
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a filter. Allowed in any phase.
    pub fn select(&mut self, selection: FilterSelection) {
        info!("Filter selected: {selection}");
        self.selection = selection;
    }

    /// Select a filter by control name (`"none"` disables the overlay)
    pub fn select_name(&mut self, name: &str) {
        self.select(FilterSelection::from_name(name));
    }

    /// Current selection
    #[must_use]
    pub fn selection(&self) -> &FilterSelection {
        &self.selection
    }

    /// Name of the active filter, `None` when the overlay is disabled
    #[must_use]
    pub fn active_filter(&self) -> Option<&str> {
        self.selection.name()
    }

    /// Mark all asset loads as resolved. Idempotent.
    pub fn mark_ready(&mut self) {
        self.readiness = Readiness::Ready;
    }

    /// Current loading phase
    #[must_use]
    pub fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Whether drawing is allowed
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.readiness == Readiness::Ready
    }
}
