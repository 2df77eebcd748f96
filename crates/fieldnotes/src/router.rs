//! View routing.
//!
//! The application has three mutually exclusive panels. Which one is shown
//! is a pure function of the navigation fragment; anything unrecognised
//! falls back to the listing.

use serde::{Deserialize, Serialize};

/// A top-level panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// The notes listing.
    #[default]
    Home,
    /// The note creation form.
    Add,
    /// The informational panel.
    About,
}

impl View {
    /// All views in navigation order.
    pub const ALL: [View; 3] = [View::Home, View::Add, View::About];

    /// Resolve a navigation fragment such as `#/add`.
    ///
    /// Accepts `#/name`, `/name` and bare `name`. Empty, absent or unknown
    /// fragments resolve to [`View::Home`].
    #[must_use]
    pub fn from_fragment(fragment: &str) -> Self {
        let name = fragment.trim();
        let name = name.strip_prefix('#').unwrap_or(name);
        let name = name.strip_prefix('/').unwrap_or(name);
        Self::from_name(name).unwrap_or_default()
    }

    /// Look up a view by its exact name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "home" => Some(Self::Home),
            "add" => Some(Self::Add),
            "about" => Some(Self::About),
            _ => None,
        }
    }

    /// The view's name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Add => "add",
            Self::About => "about",
        }
    }

    /// The canonical fragment that navigates to this view.
    #[must_use]
    pub fn fragment(self) -> String {
        format!("#/{}", self.name())
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Tracks the visible view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Router {
    current: View,
}

impl Router {
    /// Create a router showing the default view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a router for the initial fragment of a page load.
    #[must_use]
    pub fn with_fragment(fragment: &str) -> Self {
        Self {
            current: View::from_fragment(fragment),
        }
    }

    /// Apply a navigation change and return the view now visible.
    pub fn navigate(&mut self, fragment: &str) -> View {
        self.current = View::from_fragment(fragment);
        self.current
    }

    /// Show `view` directly.
    pub fn show(&mut self, view: View) {
        self.current = view;
    }

    /// The visible view.
    #[must_use]
    pub fn current(&self) -> View {
        self.current
    }

    /// Check whether `view` is the visible one.
    #[must_use]
    pub fn is_visible(&self, view: View) -> bool {
        self.current == view
    }

    /// Visibility of every view, in navigation order.
    #[must_use]
    pub fn visibility(&self) -> [(View, bool); 3] {
        View::ALL.map(|view| (view, self.is_visible(view)))
    }
}
