//! Reader display preferences and the renderer options derived from them.
//!
//! A [`ReaderPreferences`] value is immutable; `with_*` methods return a new
//! value. The derived [`RenditionOptions`] and [`ThemeRules`] serialize to
//! the JSON shapes an EPUB rendering front end consumes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::parser::ParseError;

/// Smallest accepted font scale.
pub const MIN_FONT_SIZE_PERCENT: u16 = 50;
/// Largest accepted font scale.
pub const MAX_FONT_SIZE_PERCENT: u16 = 300;
/// Default font family stack.
pub const DEFAULT_FONT_FAMILY: &str = "Georgia, serif";

/// Amber overlay applied when eye care is on.
const EYE_CARE_TINT: &str = "rgba(255, 170, 60, 0.18)";

/// Page color scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Black on white.
    #[default]
    Light,
    /// Brown on cream.
    Sepia,
    /// Light grey on near-black.
    Dark,
}

impl Theme {
    /// Config/CLI label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Sepia => "sepia",
            Self::Dark => "dark",
        }
    }

    fn colors(self) -> (&'static str, &'static str) {
        match self {
            Self::Light => ("#ffffff", "#1a1a1a"),
            Self::Sepia => ("#f4ecd8", "#5b4636"),
            Self::Dark => ("#121212", "#e0e0e0"),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "sepia" => Ok(Self::Sepia),
            "dark" => Ok(Self::Dark),
            _ => Err(ParseError::invalid_value("theme", s, "light, sepia, dark")),
        }
    }
}

/// How content flows on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flow {
    /// One page at a time.
    Paginated,
    /// Continuous vertical scrolling.
    #[default]
    ScrolledDoc,
}

impl Flow {
    /// Renderer flow label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paginated => "paginated",
            Self::ScrolledDoc => "scrolled-doc",
        }
    }

    /// Renderer view manager matching this flow.
    #[must_use]
    pub fn manager(self) -> &'static str {
        match self {
            Self::Paginated => "default",
            Self::ScrolledDoc => "continuous",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flow {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paginated" => Ok(Self::Paginated),
            "scrolled-doc" | "scrolled_doc" | "scrolled" => Ok(Self::ScrolledDoc),
            _ => Err(ParseError::invalid_value("flow", s, "paginated, scrolled-doc")),
        }
    }
}

/// Reader display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderPreferences {
    /// Color scheme.
    pub theme: Theme,
    /// CSS font-family value.
    pub font_family: String,
    /// Font scale, 50..=300.
    pub font_size_percent: u16,
    /// Content flow.
    pub flow: Flow,
    /// Warm overlay for night reading.
    pub eye_care: bool,
}

impl Default for ReaderPreferences {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size_percent: 100,
            flow: Flow::default(),
            eye_care: false,
        }
    }
}

impl ReaderPreferences {
    /// Returns a copy with `theme` replaced.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Returns a copy with `font_family` replaced; blank input keeps the default stack.
    #[must_use]
    pub fn with_font_family(mut self, font_family: impl Into<String>) -> Self {
        let font_family = font_family.into();
        let trimmed = font_family.trim();
        self.font_family = if trimmed.is_empty() {
            DEFAULT_FONT_FAMILY.to_string()
        } else {
            trimmed.to_string()
        };
        self
    }

    /// Returns a copy with the font scale clamped to 50..=300.
    #[must_use]
    pub fn with_font_size_percent(mut self, percent: u16) -> Self {
        self.font_size_percent = percent.clamp(MIN_FONT_SIZE_PERCENT, MAX_FONT_SIZE_PERCENT);
        self
    }

    /// Returns a copy with `flow` replaced.
    #[must_use]
    pub fn with_flow(mut self, flow: Flow) -> Self {
        self.flow = flow;
        self
    }

    /// Returns a copy with eye care toggled.
    #[must_use]
    pub fn with_eye_care(mut self, eye_care: bool) -> Self {
        self.eye_care = eye_care;
        self
    }

    /// Options passed to the renderer when attaching it to the viewport.
    #[must_use]
    pub fn rendition_options(&self) -> RenditionOptions {
        RenditionOptions {
            width: "100%",
            height: "100%",
            flow: self.flow.as_str(),
            manager: self.flow.manager(),
        }
    }

    /// Body styling for the renderer's theming hook.
    #[must_use]
    pub fn theme_rules(&self) -> ThemeRules {
        let (background, color) = self.theme.colors();
        ThemeRules {
            background: background.to_string(),
            color: color.to_string(),
            font_family: self.font_family.clone(),
            font_size: format!("{}%", self.font_size_percent),
            overlay: self.eye_care.then(|| EYE_CARE_TINT.to_string()),
        }
    }
}

/// Renderer attachment options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenditionOptions {
    /// Viewport width.
    pub width: &'static str,
    /// Viewport height.
    pub height: &'static str,
    /// `paginated` or `scrolled-doc`.
    pub flow: &'static str,
    /// `default` or `continuous`.
    pub manager: &'static str,
}

/// Body CSS rules for the active theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeRules {
    /// Page background color.
    pub background: String,
    /// Text color.
    pub color: String,
    /// CSS font-family.
    pub font_family: String,
    /// CSS font-size, e.g. `120%`.
    pub font_size: String,
    /// Overlay tint when eye care is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rendition_matches_scrolled_reader() {
        let options = ReaderPreferences::default().rendition_options();
        assert_eq!(
            options,
            RenditionOptions {
                width: "100%",
                height: "100%",
                flow: "scrolled-doc",
                manager: "continuous",
            }
        );
    }

    #[test]
    fn test_paginated_uses_default_manager() {
        let options = ReaderPreferences::default()
            .with_flow(Flow::Paginated)
            .rendition_options();
        assert_eq!(options.flow, "paginated");
        assert_eq!(options.manager, "default");
    }

    #[test]
    fn test_builders_return_new_values() {
        let base = ReaderPreferences::default();
        let dark = base.clone().with_theme(Theme::Dark);
        assert_eq!(base.theme, Theme::Light);
        assert_eq!(dark.theme, Theme::Dark);
    }

    #[test]
    fn test_font_size_is_clamped() {
        let prefs = ReaderPreferences::default().with_font_size_percent(10);
        assert_eq!(prefs.font_size_percent, 50);
        let prefs = prefs.with_font_size_percent(1000);
        assert_eq!(prefs.font_size_percent, 300);
    }

    #[test]
    fn test_blank_font_family_keeps_default() {
        let prefs = ReaderPreferences::default().with_font_family("   ");
        assert_eq!(prefs.font_family, DEFAULT_FONT_FAMILY);
        let prefs = prefs.with_font_family(" Literata ");
        assert_eq!(prefs.font_family, "Literata");
    }

    #[test]
    fn test_theme_rules_sepia_with_eye_care() {
        let rules = ReaderPreferences::default()
            .with_theme(Theme::Sepia)
            .with_font_size_percent(120)
            .with_eye_care(true)
            .theme_rules();
        assert_eq!(rules.background, "#f4ecd8");
        assert_eq!(rules.font_size, "120%");
        assert!(rules.overlay.is_some());
    }

    #[test]
    fn test_theme_rules_json_shape() {
        let json = serde_json::to_value(ReaderPreferences::default().theme_rules()).unwrap();
        assert_eq!(json["fontFamily"], DEFAULT_FONT_FAMILY);
        assert_eq!(json["fontSize"], "100%");
        assert!(json.get("overlay").is_none());
    }

    #[test]
    fn test_preferences_serde_labels() {
        let prefs = ReaderPreferences::default().with_theme(Theme::Dark);
        let json = serde_json::to_value(&prefs).unwrap();
        assert_eq!(json["theme"], "dark");
        assert_eq!(json["flow"], "scrolled-doc");

        let parsed: ReaderPreferences =
            serde_json::from_str(r#"{"theme":"sepia","eye_care":true}"#).unwrap();
        assert_eq!(parsed.theme, Theme::Sepia);
        assert!(parsed.eye_care);
        assert_eq!(parsed.font_size_percent, 100);
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!("Dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!("scrolled".parse::<Flow>().unwrap(), Flow::ScrolledDoc);
        let err = "neon".parse::<Theme>().unwrap_err();
        assert!(err.to_string().contains("light, sepia, dark"));
        assert!("vertical".parse::<Flow>().is_err());
    }
}
