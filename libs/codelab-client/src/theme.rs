// Theme preference controller
// Stores the raw preference, applies the effective theme document-wide,
// and keys the indicator icon off the stored preference (not the resolved theme)

use crate::error::StoreError;
use crate::store::KeyValueStore;
use codelab_common::keys::THEME_KEY;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemePreference {
    Light,
    Dark,
    System,
}

impl ThemePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
            ThemePreference::System => "system",
        }
    }

    /// Indicator icon for this stored preference
    pub fn icon(&self) -> ThemeIcon {
        match self {
            ThemePreference::Dark => ThemeIcon::Moon,
            ThemePreference::Light => ThemeIcon::Sun,
            ThemePreference::System => ThemeIcon::Desktop,
        }
    }
}

impl FromStr for ThemePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(ThemePreference::Light),
            "dark" => Ok(ThemePreference::Dark),
            "system" => Ok(ThemePreference::System),
            other => Err(format!("unknown theme '{}' (expected light, dark or system)", other)),
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective visual theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeIcon {
    Moon,
    Sun,
    Desktop,
}

impl ThemeIcon {
    pub fn class_name(&self) -> &'static str {
        match self {
            ThemeIcon::Moon => "fas fa-moon",
            ThemeIcon::Sun => "fas fa-sun",
            ThemeIcon::Desktop => "fas fa-desktop",
        }
    }
}

/// Host color-scheme signal, sampled at call time
pub trait ColorSchemeProbe: Send + Sync {
    fn prefers_dark(&self) -> bool;
}

/// Probe answering from a configured `dark`/`light` value
#[derive(Debug, Clone, Default)]
pub struct StaticColorScheme {
    scheme: Option<String>,
}

impl StaticColorScheme {
    pub fn new(scheme: Option<String>) -> Self {
        Self { scheme }
    }
}

impl ColorSchemeProbe for StaticColorScheme {
    fn prefers_dark(&self) -> bool {
        self.scheme
            .as_deref()
            .is_some_and(|scheme| scheme.trim().eq_ignore_ascii_case("dark"))
    }
}

pub trait ThemeSurface {
    /// Document-wide theme attribute
    fn apply_theme(&mut self, theme: Theme);
    fn set_icon(&mut self, icon: ThemeIcon);
}

/// Headless document: remembers what was applied so front ends can render it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub theme: Option<Theme>,
    pub icon: Option<ThemeIcon>,
}

impl ThemeSurface for Document {
    fn apply_theme(&mut self, theme: Theme) {
        self.theme = Some(theme);
    }

    fn set_icon(&mut self, icon: ThemeIcon) {
        self.icon = Some(icon);
    }
}

#[derive(Clone)]
pub struct ThemeController {
    store: Arc<dyn KeyValueStore>,
    probe: Arc<dyn ColorSchemeProbe>,
}

impl ThemeController {
    pub fn new(store: Arc<dyn KeyValueStore>, probe: Arc<dyn ColorSchemeProbe>) -> Self {
        Self { store, probe }
    }

    pub fn resolve(&self, preference: ThemePreference) -> Theme {
        match preference {
            ThemePreference::Light => Theme::Light,
            ThemePreference::Dark => Theme::Dark,
            ThemePreference::System if self.probe.prefers_dark() => Theme::Dark,
            ThemePreference::System => Theme::Light,
        }
    }

    /// Persist `preference` and apply it; returns the effective theme
    pub fn set_theme(
        &self,
        preference: ThemePreference,
        surface: &mut dyn ThemeSurface,
    ) -> Result<Theme, StoreError> {
        self.store.set(THEME_KEY, preference.as_str())?;

        let theme = self.resolve(preference);
        surface.apply_theme(theme);
        surface.set_icon(preference.icon());

        debug!(preference = %preference, theme = theme.as_str(), "Theme applied");
        Ok(theme)
    }

    /// Saved preference, `System` when absent or unreadable
    pub fn saved_preference(&self) -> ThemePreference {
        match self.store.get(THEME_KEY) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Ignoring malformed theme preference");
                ThemePreference::System
            }),
            Ok(None) => ThemePreference::System,
            Err(e) => {
                warn!(error = %e, "Failed to read theme preference");
                ThemePreference::System
            }
        }
    }

    /// Re-apply the saved preference (startup)
    pub fn restore(&self, surface: &mut dyn ThemeSurface) -> Result<Theme, StoreError> {
        self.set_theme(self.saved_preference(), surface)
    }
}
